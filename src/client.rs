use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{info, error};

use crate::{models::{ItineraryResponse, TripRequest}, submission::ItineraryBackend};

#[derive(Debug, Error)]
pub enum ItineraryError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("status={status} body={body}")] Status { status: u16, body: String },
    #[error("parse error: {0}")] Decode(String),
}

/// Shortens a response body for log lines.
fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...[{} chars total]", &text[..cut], text.chars().count()),
        None => text.to_string(),
    }
}

/// Talks to the remote itinerary-generation service. One POST per call,
/// no retries and no timeout.
pub struct ItineraryClient {
    client: Client,
    endpoint: String,
}

impl ItineraryClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(), endpoint: endpoint.into() }
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    async fn perform_api_call(&self, request: &TripRequest) -> Result<String, ItineraryError> {
        info!("🔗 Making request to: {}", self.endpoint);
        info!("📤 Request body: {}", serde_json::to_string(request).unwrap_or_default());

        let response = self.client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| ItineraryError::Http(e.to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!("❌ API Error response: {}", preview(&error_body, 500));
            return Err(ItineraryError::Status { status: status.as_u16(), body: error_body });
        }

        let response_text = response.text().await
            .map_err(|e| ItineraryError::Http(e.to_string()))?;
        info!("📥 Raw itinerary response: {}", preview(&response_text, 200));

        let parsed: ItineraryResponse = serde_json::from_str(&response_text)
            .map_err(|e| ItineraryError::Decode(format!("{}: {}", e, preview(&response_text, 200))))?;
        Ok(parsed.itinerary)
    }
}

#[async_trait]
impl ItineraryBackend for ItineraryClient {
    async fn generate(&self, request: &TripRequest) -> Result<String, ItineraryError> {
        self.perform_api_call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("héllo world", 2), "hé...[11 chars total]");
    }

    #[test]
    fn status_error_keeps_detail_for_logs() {
        let e = ItineraryError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(e.to_string(), "status=502 body=bad gateway");
    }
}
