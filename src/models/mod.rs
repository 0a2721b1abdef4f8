// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AlertRecord, BoundingBox, DirectoryUser, HelpResponse, NearbyAlert, NotificationRequest,
    Point, Recipient, Sender, StoredAlert, UserRecord, STATUS_ACTIVE,
};
pub use requests::{NearbyAlertsRequest, RespondToAlertRequest, SendAlertRequest};
pub use responses::{
    ErrorResponse, HealthResponse, NearbyAlertsResponse, RespondToAlertResponse, SendAlertResponse,
};
