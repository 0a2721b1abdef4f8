use crate::models::{
    AlertRecord, BoundingBox, DirectoryUser, HelpResponse, NotificationRequest, StoredAlert,
    UserRecord,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the realtime database
#[derive(Debug, Error)]
pub enum FirebaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid or missing auth token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Database paths the service reads and writes
#[derive(Debug, Clone)]
pub struct FirebasePaths {
    pub alerts: String,
    pub users: String,
    pub notifications: String,
}

impl Default for FirebasePaths {
    fn default() -> Self {
        Self {
            alerts: "alerts".to_string(),
            users: "users".to_string(),
            notifications: "notifications/send".to_string(),
        }
    }
}

/// Realtime database REST client
///
/// Handles all communication with the managed database including:
/// - Reading the alert snapshot and single alerts
/// - Writing new alerts and help responses
/// - Querying the user directory by latitude band
/// - Queueing notification fan-out requests
pub struct FirebaseClient {
    database_url: String,
    auth_token: Option<String>,
    client: Client,
    paths: FirebasePaths,
}

impl FirebaseClient {
    /// Create a new client
    pub fn new(
        database_url: String,
        auth_token: Option<String>,
        timeout: Duration,
        paths: FirebasePaths,
    ) -> Result<Self, FirebaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            database_url,
            auth_token: auth_token.filter(|token| !token.is_empty()),
            client,
            paths,
        })
    }

    /// Build the REST url for a database path
    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}.json",
            self.database_url.trim_end_matches('/'),
            path.trim_matches('/')
        );

        let mut params: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        if let Some(token) = &self.auth_token {
            params.push(format!("auth={}", urlencoding::encode(token)));
        }

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        url
    }

    async fn get_json(&self, url: &str, context: &str) -> Result<Value, FirebaseError> {
        let response = self.client.get(url).send().await?;
        let response = check_status(response, context).await?;

        Ok(response.json().await?)
    }

    async fn put_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        context: &str,
    ) -> Result<(), FirebaseError> {
        let response = self.client.put(url).json(body).send().await?;
        check_status(response, context).await?;

        Ok(())
    }

    /// Read every alert currently in the database
    ///
    /// Entries that cannot be parsed are skipped. Results come back in key order.
    pub async fn fetch_alerts(&self) -> Result<Vec<StoredAlert>, FirebaseError> {
        let url = self.url(&self.paths.alerts, &[]);
        let json = self.get_json(&url, "Failed to fetch alerts").await?;

        let alerts: Vec<StoredAlert> = parse_collection::<AlertRecord>(json, "alert")?
            .into_iter()
            .map(|(id, alert)| StoredAlert { id, alert })
            .collect();

        tracing::debug!("Fetched {} alerts", alerts.len());

        Ok(alerts)
    }

    /// Get a single alert by id
    pub async fn get_alert(&self, alert_id: &str) -> Result<AlertRecord, FirebaseError> {
        let url = self.url(&child(&self.paths.alerts, alert_id), &[]);
        let json = self.get_json(&url, "Failed to fetch alert").await?;

        if json.is_null() {
            return Err(FirebaseError::NotFound(format!("Alert {} not found", alert_id)));
        }

        serde_json::from_value(json)
            .map_err(|e| FirebaseError::InvalidResponse(format!("Failed to parse alert: {}", e)))
    }

    /// Store a new alert and return its id
    pub async fn create_alert(&self, alert: &AlertRecord) -> Result<String, FirebaseError> {
        let alert_id = uuid::Uuid::new_v4().to_string();
        let url = self.url(&child(&self.paths.alerts, &alert_id), &[]);

        self.put_json(&url, alert, "Failed to create alert").await?;

        tracing::debug!("Created alert {} for user {}", alert_id, alert.user_id);

        Ok(alert_id)
    }

    /// Query directory users whose latitude falls inside the box
    ///
    /// Longitude is not filtered here; callers run the exact distance check.
    pub async fn fetch_users_in_band(
        &self,
        bbox: &BoundingBox,
    ) -> Result<Vec<DirectoryUser>, FirebaseError> {
        let query = [
            ("orderBy", "\"location/latitude\"".to_string()),
            ("startAt", bbox.min_lat.to_string()),
            ("endAt", bbox.max_lat.to_string()),
        ];
        let url = self.url(&self.paths.users, &query);
        let json = self.get_json(&url, "Failed to query users").await?;

        let users: Vec<DirectoryUser> = parse_collection::<UserRecord>(json, "user")?
            .into_iter()
            .map(|(uid, user)| DirectoryUser { uid, user })
            .collect();

        tracing::debug!(
            "Queried {} users between latitudes {} and {}",
            users.len(),
            bbox.min_lat,
            bbox.max_lat
        );

        Ok(users)
    }

    /// Record a help response under the alert, one per responding user
    pub async fn record_response(
        &self,
        alert_id: &str,
        response: &HelpResponse,
    ) -> Result<(), FirebaseError> {
        let path = child(
            &child(&child(&self.paths.alerts, alert_id), "responses"),
            &response.user_id,
        );
        let url = self.url(&path, &[]);

        self.put_json(&url, response, "Failed to record response").await?;

        tracing::debug!("Recorded response: {} -> {}", response.user_id, alert_id);

        Ok(())
    }

    /// Queue a fan-out request for the push worker and return its id
    pub async fn enqueue_notification(
        &self,
        request: &NotificationRequest,
    ) -> Result<String, FirebaseError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let url = self.url(&child(&self.paths.notifications, &request_id), &[]);

        self.put_json(&url, request, "Failed to queue notification").await?;

        tracing::debug!(
            "Queued notification {} for alert {} ({} recipients)",
            request_id,
            request.alert_id,
            request.recipients.len()
        );

        Ok(request_id)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, FirebaseError> {
        let url = self.url("", &[("shallow", "true".to_string())]);
        self.get_json(&url, "Health check failed").await.map(|_| true)
    }
}

/// Append a percent-encoded key to a database path
fn child(parent: &str, key: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), urlencoding::encode(key))
}

async fn check_status(response: Response, context: &str) -> Result<Response, FirebaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FirebaseError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
    tracing::error!("{}: {} - {}", context, status, body);

    Err(FirebaseError::ApiError(format!("{}: {}", context, status)))
}

/// Parse a keyed collection, skipping entries that do not deserialize
///
/// `null` is an empty collection. Sequential integer keys come back as a
/// JSON array, with `null` holes for deleted entries.
fn parse_collection<T: DeserializeOwned>(
    json: Value,
    kind: &str,
) -> Result<Vec<(String, T)>, FirebaseError> {
    let entries: Vec<(String, Value)> = match json {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .map(|(index, value)| (index.to_string(), value))
            .collect(),
        other => {
            return Err(FirebaseError::InvalidResponse(format!(
                "Expected a {} collection, got {}",
                kind, other
            )))
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value(value) {
            Ok(record) => Some((key, record)),
            Err(e) => {
                tracing::debug!("Skipping malformed {} {}: {}", kind, key, e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> FirebaseClient {
        FirebaseClient::new(
            "https://example-db.firebaseio.test/".to_string(),
            token.map(str::to_string),
            Duration::from_secs(5),
            FirebasePaths::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client(None);
        assert_eq!(
            client.url("alerts", &[]),
            "https://example-db.firebaseio.test/alerts.json"
        );
        assert_eq!(
            client.url("", &[("shallow", "true".to_string())]),
            "https://example-db.firebaseio.test/.json?shallow=true"
        );
    }

    #[test]
    fn test_url_appends_encoded_auth() {
        let client = client(Some("se cret"));
        assert_eq!(
            client.url("users", &[("orderBy", "\"location/latitude\"".to_string())]),
            "https://example-db.firebaseio.test/users.json?orderBy=%22location%2Flatitude%22&auth=se%20cret"
        );
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = client(Some(""));
        assert_eq!(client.url("alerts", &[]), "https://example-db.firebaseio.test/alerts.json");
    }

    #[test]
    fn test_child_encodes_key() {
        assert_eq!(child("alerts/", "a b"), "alerts/a%20b");
    }

    #[test]
    fn test_parse_collection_skips_malformed() {
        let json = serde_json::json!({
            "b": { "userId": "u2", "status": "active" },
            "a": { "userId": "u1", "status": "active" },
            "broken": { "status": 7 }
        });

        let parsed = parse_collection::<AlertRecord>(json, "alert").unwrap();
        let keys: Vec<&str> = parsed.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_collection_handles_null_and_arrays() {
        let empty = parse_collection::<UserRecord>(Value::Null, "user").unwrap();
        assert!(empty.is_empty());

        let json = serde_json::json!([null, { "fcmToken": "t1" }]);
        let parsed = parse_collection::<UserRecord>(json, "user").unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].0, "1");

        assert!(parse_collection::<UserRecord>(serde_json::json!(3), "user").is_err());
    }
}
