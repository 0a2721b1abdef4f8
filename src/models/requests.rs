use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to raise an emergency alert at the caller's position
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendAlertRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "user_name", rename = "userName", default)]
    pub user_name: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[validate(length(min = 1, max = 64))]
    #[serde(alias = "emergency_type", rename = "emergencyType")]
    pub emergency_type: String,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
}

/// Request for the active alerts around the caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyAlertsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
}

/// Request to offer help on an alert
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RespondToAlertRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "user_name", rename = "userName", default)]
    pub user_name: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_request_validation() {
        let valid = NearbyAlertsRequest {
            user_id: "u1".to_string(),
            latitude: 40.7,
            longitude: -74.0,
            radius_km: Some(5.0),
        };
        assert!(valid.validate().is_ok());

        let blank_user = NearbyAlertsRequest { user_id: String::new(), ..valid.clone() };
        assert!(blank_user.validate().is_err());

        let negative_radius = NearbyAlertsRequest { radius_km: Some(-1.0), ..valid };
        assert!(negative_radius.validate().is_err());
    }

    #[test]
    fn test_send_request_accepts_snake_case() {
        let json = serde_json::json!({
            "user_id": "u1",
            "message": "fire",
            "emergency_type": "fire",
            "latitude": 1.0,
            "longitude": 2.0
        });

        let req: SendAlertRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.radius_km, None);
        assert!(req.validate().is_ok());
    }
}
