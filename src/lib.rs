//! Nearby Alerts - emergency alert service with proximity ranking
//!
//! Users raise alerts at their position, nearby users are collected as
//! push recipients, and anyone can ask for the active alerts around them.
//! The ranking core is a pure haversine filter/sort over a snapshot.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{haversine_distance, nearby_alerts, rank_nearby, InvalidInputError, Located, Ranked};
pub use models::{AlertRecord, NearbyAlert, Point, Recipient, StoredAlert};
