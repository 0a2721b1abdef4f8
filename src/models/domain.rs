use serde::{Deserialize, Serialize};

/// Status value of an alert that still wants help
pub const STATUS_ACTIVE: &str = "active";

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both coordinates finite and inside [-90, 90] / [-180, 180]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to another point in kilometers
    #[inline]
    pub fn distance_km(&self, other: &Point) -> f64 {
        crate::core::distance::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Alert document as stored under `alerts/{alertId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName", default = "default_user_name")]
    pub user_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "emergencyType", default)]
    pub emergency_type: String,
    #[serde(default)]
    pub location: Option<Point>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<i64>,
}

impl AlertRecord {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }
}

pub fn default_user_name() -> String {
    "Anonymous".to_string()
}

/// An alert together with its store key
#[derive(Debug, Clone, PartialEq)]
pub struct StoredAlert {
    pub id: String,
    pub alert: AlertRecord,
}

/// Alert as presented to a nearby viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyAlert {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub message: String,
    #[serde(rename = "emergencyType")]
    pub emergency_type: String,
    pub location: Point,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "isOwnAlert")]
    pub is_own_alert: bool,
}

/// User directory entry as stored under `users/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub location: Option<Point>,
    #[serde(rename = "fcmToken", default)]
    pub fcm_token: Option<String>,
}

/// A directory user together with their uid
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryUser {
    pub uid: String,
    pub user: UserRecord,
}

/// Someone who will receive a push for an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "fcmToken")]
    pub fcm_token: String,
    /// Kilometers from the alert; the dispatch worker reads it as `distance`
    #[serde(rename = "distance", alias = "distanceKm")]
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
}

/// Fan-out request queued under `notifications/send` for the push worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "alertId")]
    pub alert_id: String,
    pub sender: Sender,
    pub recipients: Vec<Recipient>,
    pub message: String,
    #[serde(rename = "emergencyType")]
    pub emergency_type: String,
    pub location: Point,
    pub timestamp: i64,
}

/// Offer of help, stored under `alerts/{alertId}/responses/{uid}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub message: String,
    pub timestamp: i64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
