use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::submission::SubmissionResult;

/// Everything sent to the itinerary service in one submission.
/// Field names are the wire names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub from_city: String,
    pub to_city: String,
    pub departure_date: String, // YYYY-MM-DD as entered
    pub return_date: String,
    pub num_adults: u32,
    pub num_children: u32,
    pub children_ages: Vec<u8>,
    pub min_price: u64,
    pub max_price: u64,
    pub budget: u64,
    /// Derived from the two dates, inclusive of both endpoints.
    pub days: i64,
    #[serde(default)]
    pub from_station: String,
    #[serde(default)]
    pub to_station: String,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            from_city: String::new(),
            to_city: String::new(),
            departure_date: String::new(),
            return_date: String::new(),
            num_adults: 1,
            num_children: 0,
            children_ages: Vec::new(),
            min_price: 5000,
            max_price: 30000,
            budget: 50000,
            days: 0,
            from_station: String::new(),
            to_station: String::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ItineraryResponse {
    pub itinerary: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FormView {
    pub id: Uuid,
    pub request: TripRequest,
    pub validation_error: Option<String>,
    pub submission: SubmissionResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone)]
pub struct StationLookup {
    pub city: String,
    pub station_code: Option<&'static str>,
    pub iata_code: Option<&'static str>,
}
