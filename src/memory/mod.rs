//! Memory Module
//!
//! Background memory sampling, trend and leak analysis, and manual reclaim.

mod allocator;
mod leak;
mod monitor;
mod probe;
mod reclaim;
mod sample;
mod trend;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use allocator::{allocator_stats, AllocatorStats, CountingAllocator};
pub use leak::{detect_leaks, LeakSignal, LEAK_GROWTH_THRESHOLD_PERCENT, LEAK_WINDOW};
pub use monitor::{
    DetailedMemoryStats, GcOutcome, HeapSummary, MemoryAction, MemoryMonitor, MemoryReport,
    Priority, ReclaimerInfo, Recommendation, TickReport,
};
pub use probe::{raw_from_mb, MemoryProbe, ScriptedProbe, SystemProbe};
#[cfg(all(target_os = "linux", target_env = "gnu"))]
pub use reclaim::MallocTrim;
pub use reclaim::{platform_reclaimer, MemoryReclaimer, NoopReclaimer};
pub use sample::{to_mb, MemorySample, MemoryStatus, MemoryUsage, RawMemory};
pub use trend::{calculate_trend, Confidence, Trend, TrendDirection, STABLE_BAND_PERCENT, TREND_WINDOW};

/// Monitor shared between the sampling task and request handlers.
pub type SharedMonitor = Arc<RwLock<MemoryMonitor>>;
