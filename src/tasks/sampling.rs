//! Memory Sampling Task
//!
//! Repeating sampler that drives `MemoryMonitor::tick`, plus idempotent
//! start/stop controls.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::memory::SharedMonitor;

/// Spawns a task that calls `MemoryMonitor::tick` every `interval`.
pub fn spawn_sampling_task(monitor: SharedMonitor, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            let report = {
                let mut monitor_guard = monitor.write().await;
                monitor_guard.tick()
            };

            debug!(
                "Memory tick: heap_used={}MB status={:?} actions={}",
                report.sample.heap_used(),
                report.status,
                report.actions.len()
            );
        }
    })
}

/// Starts periodic sampling.
///
/// The first start captures the baseline. Returns `false` (and logs a
/// warning) when monitoring is already running.
pub async fn start_monitoring(monitor: &SharedMonitor) -> bool {
    let mut guard = monitor.write().await;
    if guard.is_monitoring() {
        warn!("Memory monitoring already running");
        return false;
    }

    guard.capture_baseline();
    let interval = guard.config().monitor_interval;
    let handle = spawn_sampling_task(Arc::clone(monitor), interval);
    guard.attach_task(handle);

    info!("Memory monitoring started with interval of {:?}", interval);
    true
}

/// Stops periodic sampling. Returns `false` when it was not running.
pub async fn stop_monitoring(monitor: &SharedMonitor) -> bool {
    let handle = monitor.write().await.detach_task();
    match handle {
        Some(handle) => {
            handle.abort();
            info!("Memory monitoring stopped");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::memory::{MemoryMonitor, NoopReclaimer, ScriptedProbe};
    use tokio::sync::RwLock;

    fn shared(heap: &[f64], interval: Duration) -> SharedMonitor {
        let config = MonitorConfig {
            monitor_interval: interval,
            ..MonitorConfig::default()
        };
        Arc::new(RwLock::new(MemoryMonitor::new(
            config,
            Box::new(ScriptedProbe::from_heap_mb(heap)),
            Box::new(NoopReclaimer),
        )))
    }

    #[tokio::test]
    async fn test_start_captures_baseline_and_samples() {
        let monitor = shared(&[10.0, 20.0, 30.0], Duration::from_millis(50));

        assert!(start_monitoring(&monitor).await);
        tokio::time::sleep(Duration::from_millis(180)).await;

        {
            let guard = monitor.read().await;
            assert!(guard.is_monitoring());
            assert_eq!(guard.baseline().unwrap().heap_used(), 10.0);
            assert!(guard.history_len() >= 2);
        }

        assert!(stop_monitoring(&monitor).await);
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let monitor = shared(&[10.0], Duration::from_secs(30));

        assert!(start_monitoring(&monitor).await);
        assert!(!start_monitoring(&monitor).await);

        assert!(stop_monitoring(&monitor).await);
        assert!(!stop_monitoring(&monitor).await);
        assert!(!monitor.read().await.is_monitoring());
    }

    #[tokio::test]
    async fn test_restart_keeps_original_baseline() {
        let monitor = shared(&[10.0, 99.0], Duration::from_secs(30));

        start_monitoring(&monitor).await;
        stop_monitoring(&monitor).await;
        // Second start would read 99 if it re-captured
        start_monitoring(&monitor).await;

        assert_eq!(monitor.read().await.baseline().unwrap().heap_used(), 10.0);
        stop_monitoring(&monitor).await;
    }

    #[tokio::test]
    async fn test_stop_halts_sampling() {
        let monitor = shared(&[10.0], Duration::from_millis(30));

        start_monitoring(&monitor).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        stop_monitoring(&monitor).await;

        let samples = monitor.read().await.history_len();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(monitor.read().await.history_len(), samples);
    }
}
