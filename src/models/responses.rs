use serde::{Deserialize, Serialize};
use crate::models::domain::MatchedPair;

/// Response for the solve endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    #[serde(rename = "matchingId")]
    pub matching_id: uuid::Uuid,
    pub pairs: Vec<MatchedPair>,
    #[serde(rename = "participantCount")]
    pub participant_count: usize,
    #[serde(rename = "solvedAt")]
    pub solved_at: chrono::DateTime<chrono::Utc>,
}

/// One participant's ranked roommate list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedList {
    pub key: String,
    pub ranking: Vec<String>,
}

/// Response for the preferences endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesResponse {
    pub preferences: Vec<RankedList>,
}

/// Response for the roster endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    pub pairs: Vec<MatchedPair>,
    #[serde(rename = "participantCount")]
    pub participant_count: usize,
    #[serde(rename = "notificationsSent")]
    pub notifications_sent: usize,
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
