//! Memory Monitor Module
//!
//! Keeps a bounded history of process memory samples, a one-time baseline,
//! and reacts to heap pressure: reclaim passes, leak and external-memory
//! warnings, and rule-based recommendations in reports.

use std::collections::VecDeque;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::round2;
use crate::config::MonitorConfig;
use crate::memory::{
    calculate_trend, detect_leaks, platform_reclaimer, trend, LeakSignal, MemoryProbe,
    MemoryReclaimer, MemorySample, MemoryStatus, MemoryUsage, SystemProbe, Trend,
};

/// External memory (MB) that earns a warning.
pub const EXTERNAL_WARNING_MB: f64 = 50.0;
/// Trend rate (%) treated as a possible leak during a tick.
pub const LEAK_WARNING_RATE_PERCENT: f64 = 10.0;
/// Trend rate (%) that earns a monitoring recommendation.
pub const MONITORING_RECOMMENDATION_RATE_PERCENT: f64 = 5.0;
/// Samples included in a report.
pub const REPORT_WINDOW: usize = 10;

// == Outcomes ==
/// Result of a manual reclaim pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GcOutcome {
    Completed {
        before: MemoryUsage,
        after: MemoryUsage,
        /// `before.heap_used - after.heap_used`; negative if allocation outran the pass
        freed_mb: f64,
        gc_time_ms: f64,
    },
    Unavailable {
        error: String,
    },
}

impl GcOutcome {
    pub fn success(&self) -> bool {
        matches!(self, GcOutcome::Completed { .. })
    }
}

/// Corrective step taken during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MemoryAction {
    ForcedGc { outcome: GcOutcome },
    LeakWarning { rate_percent: f64 },
    ExternalMemoryWarning { external_mb: f64 },
}

/// What a single sampling tick observed and did.
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub sample: MemorySample,
    pub status: MemoryStatus,
    pub actions: Vec<MemoryAction>,
}

// == Report Types ==
#[derive(Debug, Clone, Serialize)]
pub struct ReclaimerInfo {
    pub name: &'static str,
    pub available: bool,
}

/// Snapshot returned by `MemoryMonitor::detailed_stats`.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedMemoryStats {
    pub current: MemoryUsage,
    pub status: MemoryStatus,
    pub baseline: Option<MemorySample>,
    /// Heap growth since the baseline, in MB
    pub growth_from_baseline_mb: Option<f64>,
    pub trend: Trend,
    pub leak: LeakSignal,
    pub history_len: usize,
    pub monitoring: bool,
    pub monitoring_since: Option<DateTime<Utc>>,
    pub reclaimer: ReclaimerInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeapSummary {
    pub min_mb: f64,
    pub max_mb: f64,
    pub avg_mb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    /// Kind of response: immediate, monitoring, optimization, configuration
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryReport {
    pub generated_at: DateTime<Utc>,
    pub stats: DetailedMemoryStats,
    /// Last samples, oldest first
    pub recent_history: Vec<MemorySample>,
    /// Heap figures over `recent_history`; `None` before the first sample
    pub summary: Option<HeapSummary>,
    pub recommendations: Vec<Recommendation>,
}

// == Memory Monitor ==
#[derive(Debug)]
pub struct MemoryMonitor {
    config: MonitorConfig,
    probe: Box<dyn MemoryProbe>,
    reclaimer: Box<dyn MemoryReclaimer>,
    /// Oldest first, at most `snapshot_retention` samples
    history: VecDeque<MemorySample>,
    baseline: Option<MemorySample>,
    monitoring_since: Option<DateTime<Utc>>,
    task: Option<JoinHandle<()>>,
}

impl MemoryMonitor {
    // == Constructor ==
    pub fn new(
        config: MonitorConfig,
        probe: Box<dyn MemoryProbe>,
        reclaimer: Box<dyn MemoryReclaimer>,
    ) -> Self {
        let capacity = config.snapshot_retention;
        Self {
            config,
            probe,
            reclaimer,
            history: VecDeque::with_capacity(capacity),
            baseline: None,
            monitoring_since: None,
            task: None,
        }
    }

    /// Monitor backed by the real process and the platform reclaimer.
    pub fn system(config: MonitorConfig) -> Self {
        Self::new(config, Box::new(SystemProbe::new()), platform_reclaimer())
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // == Usage ==
    /// Reads current memory figures. A failed probe reads as all zeros.
    pub fn usage(&mut self) -> MemoryUsage {
        match self.probe.read() {
            Ok(raw) => MemoryUsage::from(raw),
            Err(err) => {
                warn!("Memory probe failed: {}", err);
                MemoryUsage::default()
            }
        }
    }

    pub fn sample(&mut self) -> MemorySample {
        MemorySample::new(self.usage())
    }

    // == Baseline ==
    /// Captures the baseline on first call; later calls keep the original.
    pub fn capture_baseline(&mut self) -> &MemorySample {
        let baseline = match self.baseline.take() {
            Some(existing) => existing,
            None => {
                let sample = self.sample();
                info!("Memory baseline captured: heap_used={}MB", sample.heap_used());
                sample
            }
        };
        self.baseline.insert(baseline)
    }

    pub fn baseline(&self) -> Option<&MemorySample> {
        self.baseline.as_ref()
    }

    // == History ==
    /// Appends a sample, dropping the oldest beyond the retention limit.
    pub fn record(&mut self, sample: MemorySample) {
        self.history.push_back(sample);
        while self.history.len() > self.config.snapshot_retention {
            self.history.pop_front();
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &MemorySample> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn heap_series(&self) -> Vec<f64> {
        self.history.iter().map(MemorySample::heap_used).collect()
    }

    // == Tick ==
    /// One sampling round: sample, record, classify, then manage.
    pub fn tick(&mut self) -> TickReport {
        let sample = self.sample();
        self.record(sample.clone());

        let status = MemoryStatus::classify(sample.heap_used(), &self.config);
        match status {
            MemoryStatus::Critical => warn!(
                "Memory status CRITICAL: heap_used={}MB (threshold {}MB)",
                sample.heap_used(),
                self.config.critical_threshold_mb
            ),
            MemoryStatus::Warning => warn!(
                "Memory status WARNING: heap_used={}MB (threshold {}MB)",
                sample.heap_used(),
                self.config.warning_threshold_mb
            ),
            MemoryStatus::Normal => debug!(
                "Memory sample: heap_used={}MB rss={}MB",
                sample.heap_used(),
                sample.usage.rss
            ),
        }

        let actions = self.manage(&sample);
        TickReport {
            sample,
            status,
            actions,
        }
    }

    // == Intelligent Management ==
    /// Threshold-driven responses to a fresh sample.
    pub fn manage(&mut self, sample: &MemorySample) -> Vec<MemoryAction> {
        let mut actions = Vec::new();

        if sample.heap_used() > self.config.gc_threshold_mb {
            let outcome = self.force_gc();
            actions.push(MemoryAction::ForcedGc { outcome });
        }

        let trend = self.trend();
        if trend.is_increasing_faster_than(LEAK_WARNING_RATE_PERCENT) {
            warn!(
                "Possible memory leak: heap trending up {:.2}% over recent samples",
                trend.rate_percent
            );
            actions.push(MemoryAction::LeakWarning {
                rate_percent: trend.rate_percent,
            });
        }

        if sample.usage.external > EXTERNAL_WARNING_MB {
            warn!("High external memory usage: {}MB", sample.usage.external);
            actions.push(MemoryAction::ExternalMemoryWarning {
                external_mb: sample.usage.external,
            });
        }

        actions
    }

    pub fn trend(&self) -> Trend {
        calculate_trend(&self.heap_series())
    }

    pub fn detect_leaks(&self) -> LeakSignal {
        detect_leaks(&self.heap_series())
    }

    // == Force GC ==
    /// Runs a reclaim pass and reports heap before and after.
    pub fn force_gc(&mut self) -> GcOutcome {
        if !self.reclaimer.is_available() {
            return GcOutcome::Unavailable {
                error: "manual memory reclaim not available".to_string(),
            };
        }

        let before = self.usage();
        let started = Instant::now();
        if let Err(err) = self.reclaimer.reclaim() {
            warn!("Memory reclaim failed: {}", err);
            return GcOutcome::Unavailable {
                error: err.to_string(),
            };
        }
        let gc_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let after = self.usage();

        let freed_mb = round2(before.heap_used - after.heap_used);
        info!(
            "Memory reclaim via {}: freed {}MB in {:.2}ms",
            self.reclaimer.name(),
            freed_mb,
            gc_time_ms
        );

        GcOutcome::Completed {
            before,
            after,
            freed_mb,
            gc_time_ms,
        }
    }

    // == Detailed Stats ==
    pub fn detailed_stats(&mut self) -> DetailedMemoryStats {
        let current = self.usage();
        let growth_from_baseline_mb = self
            .baseline
            .as_ref()
            .map(|b| round2(current.heap_used - b.heap_used()));

        DetailedMemoryStats {
            current,
            status: MemoryStatus::classify(current.heap_used, &self.config),
            baseline: self.baseline.clone(),
            growth_from_baseline_mb,
            trend: self.trend(),
            leak: self.detect_leaks(),
            history_len: self.history.len(),
            monitoring: self.is_monitoring(),
            monitoring_since: self.monitoring_since,
            reclaimer: ReclaimerInfo {
                name: self.reclaimer.name(),
                available: self.reclaimer.is_available(),
            },
        }
    }

    // == Report ==
    /// Detailed stats, the recent history window and recommendations.
    pub fn generate_report(&mut self) -> MemoryReport {
        let stats = self.detailed_stats();

        let skip = self.history.len().saturating_sub(REPORT_WINDOW);
        let recent_history: Vec<MemorySample> = self.history.iter().skip(skip).cloned().collect();
        let summary = summarize(&recent_history);
        let recommendations = self.recommendations(&stats);

        MemoryReport {
            generated_at: Utc::now(),
            stats,
            recent_history,
            summary,
            recommendations,
        }
    }

    fn recommendations(&self, stats: &DetailedMemoryStats) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if stats.status == MemoryStatus::Critical {
            recommendations.push(Recommendation {
                priority: Priority::High,
                kind: "immediate",
                message: format!(
                    "Heap usage {}MB is above the critical threshold; shed load or restart",
                    stats.current.heap_used
                ),
            });
        }

        if stats
            .trend
            .is_increasing_faster_than(MONITORING_RECOMMENDATION_RATE_PERCENT)
        {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                kind: "monitoring",
                message: format!(
                    "Heap is trending up {:.2}%; increase monitoring frequency",
                    stats.trend.rate_percent
                ),
            });
        }

        if let Some(baseline) = &stats.baseline {
            if stats.current.heap_used > 2.0 * baseline.heap_used() {
                recommendations.push(Recommendation {
                    priority: Priority::Medium,
                    kind: "optimization",
                    message: format!(
                        "Heap usage more than doubled since startup ({}MB -> {}MB)",
                        baseline.heap_used(),
                        stats.current.heap_used
                    ),
                });
            }
        }

        if !stats.reclaimer.available {
            recommendations.push(Recommendation {
                priority: Priority::Low,
                kind: "configuration",
                message: "Manual memory reclaim is unavailable; build for a glibc target to enable malloc_trim".to_string(),
            });
        }

        recommendations
    }

    // == Task Handle ==
    pub fn is_monitoring(&self) -> bool {
        self.task
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub(crate) fn attach_task(&mut self, handle: JoinHandle<()>) {
        self.monitoring_since = Some(Utc::now());
        self.task = Some(handle);
    }

    pub(crate) fn detach_task(&mut self) -> Option<JoinHandle<()>> {
        self.monitoring_since = None;
        self.task.take()
    }
}

fn summarize(samples: &[MemorySample]) -> Option<HeapSummary> {
    if samples.is_empty() {
        return None;
    }
    let heap: Vec<f64> = samples.iter().map(MemorySample::heap_used).collect();
    Some(HeapSummary {
        min_mb: heap.iter().copied().fold(f64::INFINITY, f64::min),
        max_mb: heap.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_mb: round2(trend::mean(&heap)),
    })
}
