use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{client::ItineraryError, form::{FormState, InvalidRequest}, models::TripRequest};

/// Shown to the user for every kind of submission failure.
pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to generate itinerary. Please try again.";

/// Idle -> InFlight -> {Succeeded, Failed}; a settled result goes back to
/// InFlight on the next submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    #[default]
    Idle,
    InFlight,
    Succeeded { itinerary: String },
    Failed { message: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in flight")] AlreadyInFlight,
    #[error("invalid trip request: {0}")] Invalid(#[from] InvalidRequest),
}

/// Anything that can turn a trip request into itinerary markdown.
#[async_trait]
pub trait ItineraryBackend: Send + Sync {
    async fn generate(&self, request: &TripRequest) -> Result<String, ItineraryError>;
}

#[derive(Debug, Default)]
pub struct SubmissionTracker {
    state: RwLock<SubmissionResult>,
}

impl SubmissionTracker {
    pub fn new() -> Self { Self::default() }

    pub fn current(&self) -> SubmissionResult { self.state.read().clone() }

    /// Sends one request and records the outcome. Rejections (invalid form,
    /// submission already running) leave the current result untouched.
    pub async fn submit(&self, backend: &dyn ItineraryBackend, form: &FormState) -> Result<SubmissionResult, SubmitError> {
        if let Err(reason) = form.check_submittable() {
            warn!("🚫 Submission rejected: {}", reason);
            return Err(reason.into());
        }
        self.begin()?;

        let request = &form.request;
        info!("🧳 Submitting trip {} -> {} ({} days, {} adults, {} children)",
            request.from_city, request.to_city, request.days, request.num_adults, request.num_children);

        let outcome = backend.generate(request).await;
        Ok(self.settle(outcome))
    }

    fn begin(&self) -> Result<(), SubmitError> {
        let mut state = self.state.write();
        if *state == SubmissionResult::InFlight {
            return Err(SubmitError::AlreadyInFlight);
        }
        *state = SubmissionResult::InFlight;
        Ok(())
    }

    fn settle(&self, outcome: Result<String, ItineraryError>) -> SubmissionResult {
        let next = match outcome {
            Ok(itinerary) => {
                info!("✅ Itinerary received ({} chars)", itinerary.len());
                SubmissionResult::Succeeded { itinerary }
            }
            Err(e) => {
                error!("❌ Itinerary generation failed: {}", e);
                SubmissionResult::Failed { message: SUBMISSION_FAILED_MESSAGE.to_string() }
            }
        };
        *self.state.write() = next.clone();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{update_field, FormState};
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct StubBackend {
        reply: Result<String, String>,
        tracker: Option<Arc<SubmissionTracker>>,
        seen_during_call: Mutex<Option<SubmissionResult>>,
        calls: Mutex<Vec<TripRequest>>,
    }

    impl StubBackend {
        fn ok(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), tracker: None, seen_during_call: Mutex::new(None), calls: Mutex::new(Vec::new()) }
        }
        fn failing(detail: &str) -> Self {
            Self { reply: Err(detail.to_string()), ..Self::ok("") }
        }
    }

    #[async_trait]
    impl ItineraryBackend for StubBackend {
        async fn generate(&self, request: &TripRequest) -> Result<String, ItineraryError> {
            self.calls.lock().push(request.clone());
            if let Some(t) = &self.tracker {
                *self.seen_during_call.lock() = Some(t.current());
            }
            self.reply.clone().map_err(ItineraryError::Http)
        }
    }

    fn valid_form() -> FormState {
        let mut s = FormState::new();
        for (name, value) in [
            ("from_city", "New Delhi"),
            ("to_city", "Bhopal"),
            ("departure_date", "2024-03-01"),
            ("return_date", "2024-03-05"),
            ("num_adults", "2"),
        ] {
            s = update_field(&s, name, value).unwrap();
        }
        s
    }

    #[tokio::test]
    async fn success_carries_itinerary_text() {
        let tracker = SubmissionTracker::new();
        assert_eq!(tracker.current(), SubmissionResult::Idle);

        let backend = StubBackend::ok("# Day 1...");
        let result = tracker.submit(&backend, &valid_form()).await.unwrap();
        assert_eq!(result, SubmissionResult::Succeeded { itinerary: "# Day 1...".into() });
        assert_eq!(tracker.current(), result);
        assert_eq!(backend.calls.lock()[0].days, 5);
    }

    #[tokio::test]
    async fn failure_hides_detail_behind_generic_message() {
        let tracker = SubmissionTracker::new();
        let backend = StubBackend::failing("connection refused (os error 111)");
        let result = tracker.submit(&backend, &valid_form()).await.unwrap();
        assert_eq!(result, SubmissionResult::Failed { message: SUBMISSION_FAILED_MESSAGE.into() });
    }

    #[tokio::test]
    async fn state_is_in_flight_while_backend_runs() {
        let tracker = Arc::new(SubmissionTracker::new());
        let backend = StubBackend { tracker: Some(tracker.clone()), ..StubBackend::ok("ok") };
        tracker.submit(&backend, &valid_form()).await.unwrap();
        assert_eq!(*backend.seen_during_call.lock(), Some(SubmissionResult::InFlight));
    }

    #[tokio::test]
    async fn settled_result_resets_on_resubmit() {
        let tracker = SubmissionTracker::new();
        tracker.submit(&StubBackend::failing("boom"), &valid_form()).await.unwrap();
        let again = tracker.submit(&StubBackend::ok("# Retry"), &valid_form()).await.unwrap();
        assert_eq!(again, SubmissionResult::Succeeded { itinerary: "# Retry".into() });
    }

    #[tokio::test]
    async fn resubmit_while_in_flight_is_rejected() {
        let tracker = SubmissionTracker::new();
        tracker.begin().unwrap();
        let backend = StubBackend::ok("never");
        let err = tracker.submit(&backend, &valid_form()).await.unwrap_err();
        assert_eq!(err, SubmitError::AlreadyInFlight);
        assert!(backend.calls.lock().is_empty());
        assert_eq!(tracker.current(), SubmissionResult::InFlight);
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let tracker = SubmissionTracker::new();
        let backend = StubBackend::ok("never");
        let reversed = update_field(&valid_form(), "return_date", "2024-02-01").unwrap();
        let err = tracker.submit(&backend, &reversed).await.unwrap_err();
        assert_eq!(err, SubmitError::Invalid(InvalidRequest::DateOrder));
        assert!(backend.calls.lock().is_empty());
        assert_eq!(tracker.current(), SubmissionResult::Idle);
    }

    #[tokio::test]
    async fn impossible_date_is_not_sent_with_stale_days() {
        let tracker = SubmissionTracker::new();
        let backend = StubBackend::ok("never");
        let form = update_field(&valid_form(), "return_date", "2024-02-30").unwrap();
        let err = tracker.submit(&backend, &form).await.unwrap_err();
        assert_eq!(err, SubmitError::Invalid(InvalidRequest::BadDate { field: "return_date", value: "2024-02-30".into() }));
        assert!(backend.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn missing_dates_are_not_sent() {
        let tracker = SubmissionTracker::new();
        let backend = StubBackend::ok("never");
        let form = update_field(&valid_form(), "departure_date", "").unwrap();
        let form = update_field(&form, "return_date", "").unwrap();
        let err = tracker.submit(&backend, &form).await.unwrap_err();
        assert_eq!(err, SubmitError::Invalid(InvalidRequest::MissingDate("departure_date")));
        assert!(backend.calls.lock().is_empty());
        assert_eq!(tracker.current(), SubmissionResult::Idle);
    }

    #[test]
    fn result_wire_format() {
        let v = serde_json::to_value(SubmissionResult::Succeeded { itinerary: "# Day 1".into() }).unwrap();
        assert_eq!(v, serde_json::json!({"status": "succeeded", "itinerary": "# Day 1"}));
        let v = serde_json::to_value(SubmissionResult::InFlight).unwrap();
        assert_eq!(v, serde_json::json!({"status": "in_flight"}));
    }
}
