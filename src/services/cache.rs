use crate::models::StoredAlert;
use moka::future::Cache;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache for the alert snapshot
///
/// Nearby queries arrive in bursts when an alert goes out; a short TTL
/// lets them share one read of the database.
pub struct SnapshotCache {
    alerts: Cache<String, Arc<Vec<StoredAlert>>>,
    // Bumped on every invalidation; a read started under an older
    // generation must not be written back.
    generation: AtomicU64,
}

impl SnapshotCache {
    /// Create a new snapshot cache
    pub fn new(ttl_secs: u64) -> Self {
        let alerts = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            alerts,
            generation: AtomicU64::new(0),
        }
    }

    /// Cached alert snapshot, if still fresh
    pub async fn get_alerts(&self) -> Option<Arc<Vec<StoredAlert>>> {
        let key = CacheKey::alerts();
        let hit = self.alerts.get(&key).await;
        tracing::trace!("Snapshot cache {}: {}", if hit.is_some() { "hit" } else { "miss" }, key);
        hit
    }

    /// Store a freshly read snapshot
    pub async fn set_alerts(&self, alerts: Arc<Vec<StoredAlert>>) {
        self.alerts.insert(CacheKey::alerts(), alerts).await;
    }

    /// Drop the snapshot so the next read goes to the database
    pub async fn invalidate_alerts(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.alerts.invalidate(&CacheKey::alerts()).await;
        tracing::trace!("Snapshot cache invalidated");
    }

    /// Return the cached snapshot or read a new one with `fetch`
    ///
    /// A snapshot read while the cache was invalidated is still returned
    /// to the caller but never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, fetch: F) -> Result<Arc<Vec<StoredAlert>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<StoredAlert>, E>>,
    {
        if let Some(snapshot) = self.get_alerts().await {
            return Ok(snapshot);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let snapshot = Arc::new(fetch().await?);

        if self.generation.load(Ordering::SeqCst) == generation {
            self.set_alerts(snapshot.clone()).await;
            // An invalidation may land between the check and the insert
            if self.generation.load(Ordering::SeqCst) != generation {
                self.alerts.invalidate(&CacheKey::alerts()).await;
            }
        } else {
            tracing::debug!("Snapshot invalidated during read, not caching");
        }

        Ok(snapshot)
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for the full alert snapshot
    pub fn alerts() -> String {
        "alerts:snapshot".to_string()
    }
}
