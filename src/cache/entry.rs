//! Cache Entry Module
//!
//! Defines the structure for individual cache items with TTL and access metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::debug;

// == Cache Item ==
/// A single cached value with its bookkeeping.
///
/// `last_accessed` and `access_count` only change on a successful `get`.
#[derive(Debug, Clone)]
pub struct CacheItem<V> {
    /// Key the item is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Time to live in milliseconds, measured from `created_at`
    pub ttl_ms: u64,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Last successful read (Unix milliseconds), starts at `created_at`
    pub last_accessed: u64,
    /// Number of successful reads
    pub access_count: u64,
    /// Estimated size from the serialized length, 0 if serialization failed
    pub size_bytes: usize,
    /// First-insertion sequence number, used to break recency ties
    pub(crate) seq: u64,
}

impl<V: Serialize> CacheItem<V> {
    // == Constructor ==
    /// Creates a new item stamped with the current time.
    ///
    /// # Arguments
    /// * `key` - Key the item is stored under
    /// * `value` - The value to store
    /// * `ttl` - Lifetime measured from now
    /// * `seq` - Insertion order of the key
    pub fn new(key: String, value: V, ttl: Duration, seq: u64) -> Self {
        let now = current_timestamp_ms();
        let size_bytes = estimate_size(&value).unwrap_or(0);
        Self {
            key,
            value,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            created_at: now,
            last_accessed: now,
            access_count: 0,
            size_bytes,
            seq,
        }
    }
}

impl<V> CacheItem<V> {
    // == Is Expired ==
    /// Checks if the item has outlived its TTL.
    ///
    /// An item is expired once strictly more than `ttl_ms` has elapsed since
    /// creation; reads never extend the lifetime.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) > self.ttl_ms
    }

    // == Touch ==
    /// Records a successful read.
    pub fn touch(&mut self) {
        self.last_accessed = current_timestamp_ms().max(self.last_accessed);
        self.access_count += 1;
    }

    /// Milliseconds left before expiry, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let elapsed = current_timestamp_ms().saturating_sub(self.created_at);
        self.ttl_ms.saturating_sub(elapsed)
    }

    /// Milliseconds since creation.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }

    /// Recency ordering key: older reads first, insertion order on ties.
    pub(crate) fn recency(&self) -> (u64, u64) {
        (self.last_accessed, self.seq)
    }
}

// == Item Summary ==
/// Read-only view of an item used by the detailed report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ItemSummary {
    pub key: String,
    pub access_count: u64,
    pub size_bytes: usize,
    pub age_ms: u64,
    pub ttl_remaining_ms: u64,
}

impl<V> From<&CacheItem<V>> for ItemSummary {
    fn from(item: &CacheItem<V>) -> Self {
        Self {
            key: item.key.clone(),
            access_count: item.access_count,
            size_bytes: item.size_bytes,
            age_ms: item.age_ms(),
            ttl_remaining_ms: item.ttl_remaining_ms(),
        }
    }
}

// == Utility Functions ==
/// Estimates the in-memory footprint of a value from its JSON length.
///
/// Returns `None` when the value cannot be serialized (e.g. maps with
/// non-string keys); callers record such items as zero-sized.
pub fn estimate_size<V: Serialize>(value: &V) -> Option<usize> {
    match serde_json::to_vec(value) {
        Ok(bytes) => Some(bytes.len()),
        Err(err) => {
            debug!("size estimation failed, recording 0 bytes: {}", err);
            None
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
