// Service exports
pub mod cache;
pub mod firebase;

pub use cache::{CacheKey, SnapshotCache};
pub use firebase::{FirebaseClient, FirebaseError, FirebasePaths};
