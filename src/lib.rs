//! pastecache - adaptive in-process cache with memory monitoring
//!
//! Category-aware TTL cache with LRU eviction and memory-pressure cleanup,
//! plus a process memory monitor with trend and leak analysis.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod report;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheCategory, CacheManager, SharedCache};
pub use config::Config;
pub use memory::{MemoryMonitor, SharedMonitor};
pub use report::SystemReport;
pub use tasks::{spawn_cleanup_task, start_monitoring, stop_monitoring};
