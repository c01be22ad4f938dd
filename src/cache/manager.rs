//! Cache Manager Module
//!
//! Main cache engine: TTL expiry, capacity-bound LRU eviction, periodic
//! sweeps and memory-pressure cleanup on top of [`CacheStore`].

use std::cmp::Reverse;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheCategory, CacheStats, CacheStore, MAX_KEY_LENGTH};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

/// Items required before a low hit rate is worth warning about.
const LOW_HIT_RATE_MIN_ITEMS: usize = 100;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Result of one periodic sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    /// Expired items removed
    pub expired: usize,
    /// Items dropped by a memory-pressure forced cleanup, if one ran
    pub forced: Option<usize>,
}

// == Cache Manager ==
/// Bounded key/value cache with per-category TTL and LRU eviction.
#[derive(Debug)]
pub struct CacheManager<V = serde_json::Value> {
    /// Item storage
    store: CacheStore<V>,
    /// Operation counters
    stats: CacheStats,
    /// Capacity, TTL and threshold settings
    config: CacheConfig,
}

impl<V> CacheManager<V>
where
    V: Serialize + Clone,
{
    // == Constructor ==
    /// Creates a new CacheManager.
    ///
    /// A capacity of 0 is raised to 1 so the bound can always hold.
    ///
    /// # Arguments
    /// * `config` - Capacity, default TTL and memory thresholds
    pub fn new(mut config: CacheConfig) -> Self {
        if config.max_items == 0 {
            warn!("Cache capacity of 0 requested, using 1");
            config.max_items = 1;
        }
        Self {
            store: CacheStore::new(),
            stats: CacheStats::new(),
            config,
        }
    }

    /// Creates a manager with default settings and the given capacity.
    pub fn with_capacity(max_items: usize) -> Self {
        Self::new(CacheConfig {
            max_items,
            ..CacheConfig::default()
        })
    }

    // == Set ==
    /// Stores a value, overwriting any previous item under the key.
    ///
    /// The lifetime is the explicit `ttl`, else the category preset, else the
    /// configured default. When the cache is at capacity the least recently
    /// used item is evicted first. Only malformed keys are rejected.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional explicit lifetime
    /// * `category` - Optional category supplying a preset lifetime
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: V,
        ttl: Option<Duration>,
        category: Option<CacheCategory>,
    ) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        if self.store.len() >= self.config.max_items {
            self.evict_lru();
        }

        let ttl = ttl
            .or_else(|| category.map(CacheCategory::ttl))
            .unwrap_or(self.config.default_ttl);

        self.store.insert(key, value, ttl);
        self.stats.record_set();
        Ok(())
    }

    // == Get ==
    /// Retrieves a live value, recording a hit or a miss.
    ///
    /// Expired items are removed and count as misses. Reads never extend TTL.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.store.get(key) {
            Some(item) => item.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.store.remove(key);
            self.stats.record_miss();
            return None;
        }

        let item = self.store.get_mut(key)?;
        item.touch();
        self.stats.record_hit();
        Some(item.value.clone())
    }

    // == Delete ==
    /// Removes an item. Returns whether the key was present.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.store.remove(key).is_some() {
            self.stats.record_delete();
            true
        } else {
            false
        }
    }

    // == Has ==
    /// Checks for a live item without touching recency or counters.
    pub fn has(&self, key: &str) -> bool {
        self.store
            .get(key)
            .map(|item| !item.is_expired())
            .unwrap_or(false)
    }

    // == Clear ==
    /// Empties the cache, returning how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.store.clear();
        info!("Cache cleared: {} items removed", count);
        count
    }

    // == Cleanup ==
    /// Periodic sweep: drops expired items, then checks memory pressure.
    pub fn cleanup(&mut self) -> CleanupOutcome {
        let expired: Vec<String> = self
            .store
            .values()
            .filter(|item| item.is_expired())
            .map(|item| item.key.clone())
            .collect();

        let removed = self.store.remove_many(&expired);
        if removed > 0 {
            info!("Cache cleanup: removed {} expired items", removed);
        } else {
            debug!("Cache cleanup: no expired items found");
        }

        CleanupOutcome {
            expired: removed,
            forced: self.check_memory_optimization(),
        }
    }

    // == Memory Optimization ==
    /// Forces a cleanup when the estimated size exceeds the memory threshold
    /// and warns when the hit rate is low on a well-populated cache.
    ///
    /// Returns the number of items dropped if a forced cleanup ran.
    pub fn check_memory_optimization(&mut self) -> Option<usize> {
        let forced = if self.memory_mb() > self.config.memory_threshold_mb {
            warn!(
                "Cache memory {:.2}MB exceeds threshold {:.2}MB, forcing cleanup",
                self.memory_mb(),
                self.config.memory_threshold_mb
            );
            Some(self.force_cleanup())
        } else {
            None
        };

        let hit_rate = self.stats.hit_rate();
        if hit_rate < self.config.low_hit_rate_threshold
            && self.store.len() > LOW_HIT_RATE_MIN_ITEMS
        {
            warn!(
                "Low cache hit rate: {:.1}% across {} items",
                hit_rate * 100.0,
                self.store.len()
            );
        }

        forced
    }

    // == Force Cleanup ==
    /// Keeps the most recently accessed half (rounded up) and drops the rest.
    ///
    /// Ties on `last_accessed` fall back to insertion order: the earlier
    /// inserted item ranks as more recent. Returns the number of items dropped.
    pub fn force_cleanup(&mut self) -> usize {
        let mut ranked = self.store.iter_ordered();
        let total = ranked.len();
        // Stable sort keeps insertion order among equal timestamps
        ranked.sort_by_key(|item| Reverse(item.last_accessed));

        let keep = total.div_ceil(2);
        let doomed: Vec<String> = ranked[keep..].iter().map(|item| item.key.clone()).collect();

        let removed = self.store.remove_many(&doomed);
        self.stats.record_forced_removals(removed);

        info!(
            "Forced cache cleanup: kept {} of {} items ({} removed)",
            keep, total, removed
        );
        removed
    }

    // == Evict LRU ==
    /// Drops the item with the oldest `last_accessed`, earliest inserted on ties.
    fn evict_lru(&mut self) -> Option<String> {
        let victim = self
            .store
            .values()
            .min_by_key(|item| item.recency())
            .map(|item| item.key.clone())?;

        self.store.remove(&victim);
        self.stats.record_eviction();
        debug!("Evicted least recently used item '{}'", victim);
        Some(victim)
    }

    // == Cache-aside ==
    /// Returns the cached value or loads, stores and returns a fresh one.
    ///
    /// Loaded values use the category preset TTL. A loader returning `None`
    /// leaves the cache untouched.
    pub fn get_or_insert_with<F>(
        &mut self,
        category: CacheCategory,
        id: &str,
        loader: F,
    ) -> Option<V>
    where
        F: FnOnce() -> Option<V>,
    {
        if let Some(value) = self.get_scoped(category, id) {
            return Some(value);
        }

        let value = loader()?;
        if let Err(err) = self.set_scoped(category, id, value.clone()) {
            warn!("Cache-aside insert for '{}' skipped: {}", id, err);
        }
        Some(value)
    }

    // == Category Wrappers ==
    /// Stores `value` under `"{category}:{id}"` with the category preset TTL.
    pub fn set_scoped(&mut self, category: CacheCategory, id: &str, value: V) -> Result<()> {
        self.set(category.scoped_key(id), value, None, Some(category))
    }

    pub fn get_scoped(&mut self, category: CacheCategory, id: &str) -> Option<V> {
        self.get(&category.scoped_key(id))
    }

    pub fn delete_scoped(&mut self, category: CacheCategory, id: &str) -> bool {
        self.delete(&category.scoped_key(id))
    }

    pub fn has_scoped(&self, category: CacheCategory, id: &str) -> bool {
        self.has(&category.scoped_key(id))
    }
}

impl<V> CacheManager<V> {
    /// Current counters.
    pub fn counters(&self) -> &CacheStats {
        &self.stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &CacheStore<V> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut CacheStore<V> {
        &mut self.store
    }

    /// Estimated size of all items, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.store.memory_bytes()
    }

    /// Estimated size of all items, in megabytes.
    pub fn memory_mb(&self) -> f64 {
        self.store.memory_bytes() as f64 / BYTES_PER_MB
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
