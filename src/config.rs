use std::env;

pub const DEFAULT_ITINERARY_API_URL: &str = "http://localhost:8080/generate-itinerary";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_FORMS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub itinerary_api_url: String,
    pub port: u16,
    pub max_forms: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { itinerary_api_url: DEFAULT_ITINERARY_API_URL.to_string(), port: DEFAULT_PORT, max_forms: DEFAULT_MAX_FORMS }
    }
}

impl Config {
    /// Reads `ITINERARY_API_URL`, `PORT` and `MAX_FORMS`; missing or malformed values fall back to defaults.
    pub fn from_env() -> Self {
        let itinerary_api_url = env::var("ITINERARY_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ITINERARY_API_URL.to_string());
        let port = env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_PORT);
        let max_forms = env::var("MAX_FORMS").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_MAX_FORMS);
        Self { itinerary_api_url, port, max_forms }
    }
}
