//! Leak heuristic: sustained monotonic heap growth across recent samples.

use serde::Serialize;

use crate::cache::round2;
use crate::memory::Confidence;

/// Samples inspected for monotonic growth.
pub const LEAK_WINDOW: usize = 5;
/// Growth over the window (%) that counts as a leak.
pub const LEAK_GROWTH_THRESHOLD_PERCENT: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeakSignal {
    Detected {
        confidence: Confidence,
        growth_mb: f64,
        growth_rate_percent: f64,
    },
    NotDetected {
        reason: String,
    },
}

impl LeakSignal {
    pub fn is_detected(&self) -> bool {
        matches!(self, LeakSignal::Detected { .. })
    }

    fn not_detected(reason: &str) -> Self {
        LeakSignal::NotDetected {
            reason: reason.to_string(),
        }
    }
}

/// Checks the last [`LEAK_WINDOW`] `heap_used` values (oldest first) for
/// non-decreasing growth above the threshold.
pub fn detect_leaks(heap_used: &[f64]) -> LeakSignal {
    if heap_used.len() < LEAK_WINDOW {
        return LeakSignal::not_detected("insufficient data");
    }

    let window = &heap_used[heap_used.len() - LEAK_WINDOW..];
    let monotonic = window.windows(2).all(|pair| pair[1] >= pair[0]);
    if !monotonic {
        return LeakSignal::not_detected("no sustained growth");
    }

    let first = window[0];
    let growth = window[LEAK_WINDOW - 1] - first;
    if first <= 0.0 {
        return LeakSignal::not_detected("no baseline heap usage");
    }

    let growth_rate = growth / first * 100.0;
    if growth_rate > LEAK_GROWTH_THRESHOLD_PERCENT {
        LeakSignal::Detected {
            confidence: Confidence::High,
            growth_mb: round2(growth),
            growth_rate_percent: round2(growth_rate),
        }
    } else {
        LeakSignal::not_detected("growth below threshold")
    }
}
