//! Cache Module
//!
//! Provides in-memory caching with per-category TTL, LRU eviction and
//! memory-pressure cleanup.

mod category;
mod entry;
mod manager;
mod report;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use category::{group_of, CacheCategory};
pub use entry::{current_timestamp_ms, estimate_size, CacheItem, ItemSummary};
pub use manager::{CacheManager, CleanupOutcome};
pub use report::{CacheStatsSnapshot, CategoryReport, DetailedCacheReport};
pub use stats::CacheStats;
pub use store::CacheStore;

pub(crate) use report::round2;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Cache shared between the cleanup task and request handlers.
pub type SharedCache = std::sync::Arc<tokio::sync::RwLock<CacheManager>>;
