//! Combined system report: the cache breakdown next to the memory report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheManager, DetailedCacheReport};
use crate::memory::{MemoryMonitor, MemoryReport};

#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub generated_at: DateTime<Utc>,
    pub cache: DetailedCacheReport,
    pub memory: MemoryReport,
}

impl SystemReport {
    /// Builds both halves. Taking the monitor mutably lets the memory half
    /// read a fresh sample.
    pub fn collect<V>(cache: &CacheManager<V>, monitor: &mut MemoryMonitor) -> Self {
        Self {
            generated_at: Utc::now(),
            cache: cache.detailed_report(),
            memory: monitor.generate_report(),
        }
    }
}
