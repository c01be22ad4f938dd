//! Heap usage trend over the sample history.
//!
//! Compares the mean of the last [`TREND_WINDOW`] samples with the mean of the
//! window before it. Window size and the stable band are tunables, not derived
//! values.

use serde::Serialize;

use crate::cache::round2;

/// Samples per comparison window.
pub const TREND_WINDOW: usize = 5;
/// History length at which confidence becomes high.
pub const HIGH_CONFIDENCE_SAMPLES: usize = 2 * TREND_WINDOW;
/// Absolute change (%) still reported as stable.
pub const STABLE_BAND_PERCENT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Stable,
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Direction and rate of heap change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub direction: TrendDirection,
    /// Percent change of the recent mean over the older mean, 2 decimals
    pub rate_percent: f64,
    pub confidence: Confidence,
}

impl Trend {
    pub fn unknown() -> Self {
        Self {
            direction: TrendDirection::Stable,
            rate_percent: 0.0,
            confidence: Confidence::Low,
        }
    }

    pub fn is_increasing_faster_than(&self, rate_percent: f64) -> bool {
        self.direction == TrendDirection::Increasing && self.rate_percent > rate_percent
    }
}

/// Computes the trend of `heap_used` values, oldest first.
pub fn calculate_trend(heap_used: &[f64]) -> Trend {
    let len = heap_used.len();
    if len < 2 {
        return Trend::unknown();
    }

    let recent = &heap_used[len.saturating_sub(TREND_WINDOW)..];
    let older = &heap_used[len.saturating_sub(2 * TREND_WINDOW)..len.saturating_sub(TREND_WINDOW)];
    if older.is_empty() {
        return Trend::unknown();
    }

    let recent_avg = mean(recent);
    let older_avg = mean(older);
    let rate = if older_avg == 0.0 {
        0.0
    } else {
        (recent_avg - older_avg) / older_avg * 100.0
    };

    let direction = if rate.abs() < STABLE_BAND_PERCENT {
        TrendDirection::Stable
    } else if rate > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    let confidence = if len < HIGH_CONFIDENCE_SAMPLES {
        Confidence::Medium
    } else {
        Confidence::High
    };

    Trend {
        direction,
        rate_percent: round2(rate),
        confidence,
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
