use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::AlertSettings;
use crate::core::{
    build_recipients, calculate_bounding_box, find_nearby_users, nearby_alerts, validate_query,
};
use crate::models::domain::default_user_name;
use crate::models::{
    AlertRecord, ErrorResponse, HealthResponse, HelpResponse, NearbyAlertsRequest,
    NearbyAlertsResponse, NotificationRequest, Point, RespondToAlertRequest,
    RespondToAlertResponse, SendAlertRequest, SendAlertResponse, Sender, StoredAlert,
    STATUS_ACTIVE,
};
use crate::services::{FirebaseClient, FirebaseError, SnapshotCache};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub firebase: Arc<FirebaseClient>,
    pub cache: Arc<SnapshotCache>,
    pub alerts: AlertSettings,
}

/// Configure all alert-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/alerts", web::post().to(send_alert))
        .route("/alerts/nearby", web::post().to(get_nearby_alerts))
        .route("/alerts/{alert_id}/responses", web::post().to(respond_to_alert));
}

fn error_body(error: &str, message: impl ToString, status_code: u16) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.to_string(),
        status_code,
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.firebase.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Read the alert snapshot, sharing recent reads through the cache
async fn load_snapshot(state: &AppState) -> Result<Arc<Vec<StoredAlert>>, FirebaseError> {
    state.cache.get_or_fetch(|| state.firebase.fetch_alerts()).await
}

/// Send alert endpoint
///
/// POST /api/v1/alerts
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "userName": "string",
///   "message": "string",
///   "emergencyType": "string",
///   "latitude": 40.71,
///   "longitude": -74.0,
///   "radiusKm": 10
/// }
/// ```
///
/// Stores the alert, then notifies nearby users on a best-effort basis:
/// the alert is reported as sent even if the fan-out could not be queued.
async fn send_alert(
    state: web::Data<AppState>,
    req: web::Json<SendAlertRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for send_alert request: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body("Validation failed", errors, 400));
    }

    let req = req.into_inner();
    let origin = Point::new(req.latitude, req.longitude);
    let radius_km = state.alerts.effective_radius(req.radius_km);

    if let Err(e) = validate_query(&origin, radius_km) {
        return HttpResponse::BadRequest().json(error_body("Invalid input", e, 400));
    }

    let user_name = req
        .user_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_user_name);

    let alert = AlertRecord {
        user_id: req.user_id.clone(),
        user_name: user_name.clone(),
        message: req.message.clone(),
        emergency_type: req.emergency_type.clone(),
        location: Some(origin),
        status: STATUS_ACTIVE.to_string(),
        created_at: Some(chrono::Utc::now().timestamp_millis()),
    };

    let alert_id = match state.firebase.create_alert(&alert).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to create alert for {}: {}", req.user_id, e);
            return HttpResponse::InternalServerError()
                .json(error_body("Failed to create alert", e, 500));
        }
    };

    state.cache.invalidate_alerts().await;

    let bbox = calculate_bounding_box(origin.latitude, origin.longitude, radius_km);
    let directory = match state.firebase.fetch_users_in_band(&bbox).await {
        Ok(users) => users,
        Err(e) => {
            tracing::warn!("Failed to query users near alert {}, nobody notified: {}", alert_id, e);
            vec![]
        }
    };

    let nearby = match find_nearby_users(origin, directory, radius_km, &req.user_id) {
        Ok(nearby) => nearby,
        Err(e) => {
            return HttpResponse::BadRequest().json(error_body("Invalid input", e, 400));
        }
    };
    let recipients = build_recipients(&nearby);

    if nearby.is_empty() {
        tracing::info!("No nearby users found to notify for alert {}", alert_id);
    } else {
        tracing::info!(
            "Found {} nearby users for alert {} ({} with delivery tokens)",
            nearby.len(),
            alert_id,
            recipients.len()
        );
    }

    let recipient_count = recipients.len();
    if !recipients.is_empty() {
        let request = NotificationRequest {
            alert_id: alert_id.clone(),
            sender: Sender {
                user_id: req.user_id.clone(),
                user_name,
            },
            recipients,
            message: req.message,
            emergency_type: req.emergency_type,
            location: origin,
            timestamp: chrono::Utc::now().timestamp_millis(),
        };

        if let Err(e) = state.firebase.enqueue_notification(&request).await {
            tracing::warn!("Alert {} stored but notification could not be queued: {}", alert_id, e);
        }
    }

    HttpResponse::Ok().json(SendAlertResponse {
        success: true,
        alert_id,
        notified_users: nearby.len(),
        recipients: recipient_count,
    })
}

/// Nearby alerts endpoint
///
/// POST /api/v1/alerts/nearby
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "latitude": 40.71,
///   "longitude": -74.0,
///   "radiusKm": 10
/// }
/// ```
async fn get_nearby_alerts(
    state: web::Data<AppState>,
    req: web::Json<NearbyAlertsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for nearby request: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body("Validation failed", errors, 400));
    }

    let origin = Point::new(req.latitude, req.longitude);
    let radius_km = state.alerts.effective_radius(req.radius_km);

    if let Err(e) = validate_query(&origin, radius_km) {
        return HttpResponse::BadRequest().json(error_body("Invalid input", e, 400));
    }

    let snapshot = match load_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Failed to load alerts for {}: {}", req.user_id, e);
            return HttpResponse::InternalServerError()
                .json(error_body("Failed to load alerts", e, 500));
        }
    };

    let total_alerts = snapshot.len();
    let alerts = match nearby_alerts(&req.user_id, origin, snapshot.iter(), radius_km) {
        Ok(alerts) => alerts,
        Err(e) => {
            return HttpResponse::BadRequest().json(error_body("Invalid input", e, 400));
        }
    };

    tracing::info!(
        "Returning {} alerts within {}km for user {} (from {} stored)",
        alerts.len(),
        radius_km,
        req.user_id,
        total_alerts
    );

    HttpResponse::Ok().json(NearbyAlertsResponse {
        total: alerts.len(),
        alerts,
    })
}

/// Respond to alert endpoint
///
/// POST /api/v1/alerts/{alertId}/responses
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "userName": "string",
///   "message": "string"
/// }
/// ```
async fn respond_to_alert(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<RespondToAlertRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body("Validation failed", errors, 400));
    }

    let alert_id = path.into_inner();
    let req = req.into_inner();

    match state.firebase.get_alert(&alert_id).await {
        Ok(_) => {}
        Err(FirebaseError::NotFound(message)) => {
            return HttpResponse::NotFound().json(error_body("Alert not found", message, 404));
        }
        Err(e) => {
            tracing::error!("Failed to fetch alert {}: {}", alert_id, e);
            return HttpResponse::InternalServerError()
                .json(error_body("Failed to fetch alert", e, 500));
        }
    }

    let response = HelpResponse {
        user_id: req.user_id,
        user_name: req
            .user_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(default_user_name),
        message: req.message,
        timestamp: chrono::Utc::now().timestamp_millis(),
    };

    match state.firebase.record_response(&alert_id, &response).await {
        Ok(()) => {
            tracing::info!("User {} responded to alert {}", response.user_id, alert_id);
            HttpResponse::Ok().json(RespondToAlertResponse { success: true })
        }
        Err(e) => {
            tracing::error!("Failed to record response on alert {}: {}", alert_id, e);
            HttpResponse::InternalServerError()
                .json(error_body("Failed to record response", e, 500))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body() {
        let body = error_body("Invalid input", "bad radius", 400);
        assert_eq!(body.error, "Invalid input");
        assert_eq!(body.message, "bad radius");
        assert_eq!(body.status_code, 400);
    }
}
