use axum::{Json, Router, extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}};
use std::{collections::HashMap, sync::Arc};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::{
    config::DEFAULT_MAX_FORMS,
    form::{reduce, FormError, FormEvent, FormState},
    models::{FormView, StationLookup},
    stations,
    submission::{ItineraryBackend, SubmissionTracker, SubmitError},
};

pub struct FormSession {
    pub form: FormState,
    pub submission: Arc<SubmissionTracker>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSession {
    fn new() -> Self {
        let now = Utc::now();
        Self { form: FormState::new(), submission: Arc::default(), created_at: now, updated_at: now }
    }

    fn view(&self, id: Uuid) -> FormView {
        FormView {
            id,
            request: self.form.request.clone(),
            validation_error: self.form.validation_error.clone(),
            submission: self.submission.current(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<HashMap<Uuid, FormSession>>>,
    pub backend: Arc<dyn ItineraryBackend>,
    pub max_sessions: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn ItineraryBackend>) -> Self {
        Self { store: Arc::default(), backend, max_sessions: DEFAULT_MAX_FORMS }
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl From<FormError> for ApiError {
    fn from(e: FormError) -> Self { ApiError(StatusCode::BAD_REQUEST, e.to_string()) }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::AlreadyInFlight => ApiError(StatusCode::CONFLICT, e.to_string()),
            SubmitError::Invalid(reason) => ApiError(StatusCode::UNPROCESSABLE_ENTITY, reason.to_string()),
        }
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError(StatusCode::NOT_FOUND, format!("no form with id {}", id))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/forms", post(create_form))
        .route("/api/forms/:id", get(get_form).delete(delete_form))
        .route("/api/forms/:id/events", post(apply_event))
        .route("/api/forms/:id/submit", post(submit_form))
        .route("/api/stations", get(lookup_stations))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_form(State(state): State<AppState>) -> Result<(StatusCode, Json<FormView>), ApiError> {
    let id = Uuid::new_v4();
    let session = FormSession::new();
    let view = session.view(id);
    {
        let mut store = state.store.write();
        if store.len() >= state.max_sessions {
            tracing::warn!("🚫 Form limit reached ({} sessions)", store.len());
            return Err(ApiError(StatusCode::SERVICE_UNAVAILABLE, "too many open forms; delete one and retry".to_string()));
        }
        store.insert(id, session);
    }
    tracing::info!("📝 Created form {}", id);
    Ok((StatusCode::CREATED, Json(view)))
}

/// Drops the session. A submission already running finishes on its own and
/// its result is discarded.
pub async fn delete_form(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.store.write().remove(&id).ok_or_else(|| not_found(id))?;
    tracing::info!("🗑️ Deleted form {}", id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_form(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<FormView>, ApiError> {
    let store = state.store.read();
    let session = store.get(&id).ok_or_else(|| not_found(id))?;
    Ok(Json(session.view(id)))
}

pub async fn apply_event(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(event): Json<FormEvent>,
) -> Result<Json<FormView>, ApiError> {
    let mut store = state.store.write();
    let session = store.get_mut(&id).ok_or_else(|| not_found(id))?;
    tracing::debug!(form = %id, ?event, "applying form event");
    session.form = reduce(&session.form, event)?;
    session.updated_at = Utc::now();
    Ok(Json(session.view(id)))
}

pub async fn submit_form(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<FormView>, ApiError> {
    let (form, tracker) = {
        let store = state.store.read();
        let session = store.get(&id).ok_or_else(|| not_found(id))?;
        (session.form.clone(), session.submission.clone())
    };

    // Run to completion even if the caller goes away, so the tracker never
    // stays stuck in flight.
    let backend = state.backend.clone();
    let task_tracker = tracker.clone();
    let outcome = tokio::spawn(async move { task_tracker.submit(backend.as_ref(), &form).await })
        .await
        .map_err(|e| {
            tracing::error!("❌ Submission task for form {} failed: {}", id, e);
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, "submission task failed".to_string())
        })?;
    outcome?;

    let mut store = state.store.write();
    let session = store.get_mut(&id).ok_or_else(|| not_found(id))?;
    session.updated_at = Utc::now();
    Ok(Json(session.view(id)))
}

#[derive(Debug, Deserialize)]
pub struct StationQuery {
    pub city: String,
}

pub async fn lookup_stations(Query(q): Query<StationQuery>) -> Json<StationLookup> {
    Json(stations::lookup(&q.city))
}
