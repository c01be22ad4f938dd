//! Cache Cleanup Task
//!
//! Background task that periodically sweeps expired items and applies the
//! memory-pressure check.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically runs `CacheManager::cleanup`.
///
/// The task loops forever, sleeping for `interval` between sweeps and holding
/// the write lock only for the duration of one sweep.
///
/// # Returns
/// A JoinHandle for the spawned task; abort it to stop the sweeps.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheManager::new(CacheConfig::default())));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let outcome = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if let Some(forced) = outcome.forced {
                info!(
                    "Cache cleanup: {} expired, {} dropped under memory pressure",
                    outcome.expired, forced
                );
            } else {
                debug!("Cache cleanup pass finished: {} expired", outcome.expired);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheManager;
    use crate::config::CacheConfig;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared(config: CacheConfig) -> SharedCache {
        Arc::new(RwLock::new(CacheManager::new(config)))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_items() {
        let cache = shared(CacheConfig::default());
        cache
            .write()
            .await
            .set("expire_soon", json!("value"), Some(Duration::from_millis(50)), None)
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(350)).await;

        {
            let cache_guard = cache.read().await;
            assert!(cache_guard.is_empty(), "Expired item should have been swept");
            // The sweep removed it, not a read
            assert_eq!(cache_guard.counters().misses, 0);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_live_items() {
        let cache = shared(CacheConfig::default());
        cache
            .write()
            .await
            .set("long_lived", json!("value"), Some(Duration::from_secs(3600)), None)
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(cache.write().await.get("long_lived"), Some(json!("value")));
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_applies_memory_pressure() {
        let cache = shared(CacheConfig {
            // ~210 bytes: six 50-byte items exceed it, three do not
            memory_threshold_mb: 0.0002,
            ..CacheConfig::default()
        });
        {
            let mut guard = cache.write().await;
            for i in 0..6 {
                guard.set(format!("k{}", i), json!("x".repeat(48)), None, None).unwrap();
            }
        }

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.abort();

        assert_eq!(cache.read().await.len(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = shared(CacheConfig::default());
        let handle = spawn_cleanup_task(cache, Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
