//! Cache Statistics Module
//!
//! Tracks cache performance counters: hits, misses, sets, deletes, capacity
//! evictions and forced-cleanup removals.

use serde::Serialize;

// == Cache Stats ==
/// Running operation counters.
///
/// `hits + misses` always equals the number of `get` calls issued.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered from a live item
    pub hits: u64,
    /// Reads for absent or expired keys
    pub misses: u64,
    /// Successful inserts and overwrites
    pub sets: u64,
    /// Explicit deletes of present keys
    pub deletes: u64,
    /// Items removed by the capacity bound (LRU eviction only)
    pub evictions: u64,
    /// Items dropped by memory-pressure forced cleanups
    pub forced_removals: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_delete(&mut self) {
        self.deletes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_forced_removals(&mut self, count: usize) {
        self.forced_removals += count as u64;
    }
}
