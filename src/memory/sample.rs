//! Memory samples and status classification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::round2;
use crate::config::MonitorConfig;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Raw probe reading, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawMemory {
    pub rss: u64,
    pub heap_total: u64,
    pub heap_used: u64,
    pub external: u64,
    pub array_buffers: u64,
}

/// Process memory figures in MB, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemoryUsage {
    /// Resident set size
    pub rss: f64,
    /// Allocator high-water mark (or virtual size when untracked)
    pub heap_total: f64,
    /// Live allocated bytes (or RSS when untracked)
    pub heap_used: f64,
    /// Resident memory outside the tracked heap
    pub external: f64,
    /// No native analogue; always 0
    pub array_buffers: f64,
}

impl From<RawMemory> for MemoryUsage {
    fn from(raw: RawMemory) -> Self {
        Self {
            rss: to_mb(raw.rss),
            heap_total: to_mb(raw.heap_total),
            heap_used: to_mb(raw.heap_used),
            external: to_mb(raw.external),
            array_buffers: to_mb(raw.array_buffers),
        }
    }
}

/// One timestamped reading. Immutable once taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemorySample {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub usage: MemoryUsage,
}

impl MemorySample {
    pub fn new(usage: MemoryUsage) -> Self {
        Self {
            timestamp: Utc::now(),
            usage,
        }
    }

    pub fn heap_used(&self) -> f64 {
        self.usage.heap_used
    }
}

/// Heap pressure level of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    Normal,
    Warning,
    Critical,
}

impl MemoryStatus {
    /// Classifies `heap_used` (MB) against the configured thresholds.
    pub fn classify(heap_used: f64, config: &MonitorConfig) -> Self {
        if heap_used > config.critical_threshold_mb {
            MemoryStatus::Critical
        } else if heap_used > config.warning_threshold_mb {
            MemoryStatus::Warning
        } else {
            MemoryStatus::Normal
        }
    }
}

pub fn to_mb(bytes: u64) -> f64 {
    round2(bytes as f64 / BYTES_PER_MB)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mb_rounds_to_two_decimals() {
        assert_eq!(to_mb(0), 0.0);
        assert_eq!(to_mb(1024 * 1024), 1.0);
        assert_eq!(to_mb(1_500_000), 1.43);
    }

    #[test]
    fn test_usage_from_raw() {
        let usage = MemoryUsage::from(RawMemory {
            rss: 200 * 1024 * 1024,
            heap_total: 120 * 1024 * 1024,
            heap_used: 100 * 1024 * 1024,
            external: 100 * 1024 * 1024,
            array_buffers: 0,
        });
        assert_eq!(usage.rss, 200.0);
        assert_eq!(usage.heap_used, 100.0);
        assert_eq!(usage.array_buffers, 0.0);
    }

    #[test]
    fn test_status_thresholds() {
        let config = MonitorConfig::default();
        assert_eq!(MemoryStatus::classify(50.0, &config), MemoryStatus::Normal);
        assert_eq!(MemoryStatus::classify(100.0, &config), MemoryStatus::Normal);
        assert_eq!(MemoryStatus::classify(100.01, &config), MemoryStatus::Warning);
        assert_eq!(MemoryStatus::classify(250.0, &config), MemoryStatus::Critical);
    }

    #[test]
    fn test_sample_serializes_flat() {
        let sample = MemorySample::new(MemoryUsage {
            heap_used: 12.5,
            ..MemoryUsage::default()
        });
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["heap_used"], 12.5);
        assert!(json["timestamp"].is_string());
    }
}
