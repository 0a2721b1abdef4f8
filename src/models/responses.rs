use serde::{Deserialize, Serialize};
use crate::models::domain::NearbyAlert;

/// Response for the send alert endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendAlertResponse {
    pub success: bool,
    #[serde(rename = "alertId")]
    pub alert_id: String,
    #[serde(rename = "notifiedUsers")]
    pub notified_users: usize,
    pub recipients: usize,
}

/// Response for the nearby alerts endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAlertsResponse {
    pub alerts: Vec<NearbyAlert>,
    pub total: usize,
}

/// Response for the respond endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondToAlertResponse {
    pub success: bool,
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
