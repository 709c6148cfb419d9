use serde::{Deserialize, Serialize};

use super::domain::SearchOutcome;

/// Response for the search endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_id: String,
    #[serde(flatten)]
    pub outcome: SearchOutcome,
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Nearest known city to a point
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestCityResponse {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}
