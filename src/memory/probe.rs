//! Memory probes: where raw readings come from.

use std::fmt;

use sysinfo::{Pid, System};

use crate::error::MemoryError;
use crate::memory::allocator::allocator_stats;
use crate::memory::RawMemory;

/// Source of process memory readings.
pub trait MemoryProbe: fmt::Debug + Send + Sync {
    fn read(&mut self) -> Result<RawMemory, MemoryError>;
}

// == System Probe ==
/// Reads the current process through `sysinfo`, combined with the
/// [`CountingAllocator`](crate::memory::CountingAllocator) counters when installed.
pub struct SystemProbe {
    pid: Option<Pid>,
    system: System,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self {
            pid: sysinfo::get_current_pid().ok(),
            system: System::new(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SystemProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemProbe").field("pid", &self.pid).finish()
    }
}

impl MemoryProbe for SystemProbe {
    fn read(&mut self) -> Result<RawMemory, MemoryError> {
        let pid = self
            .pid
            .ok_or_else(|| MemoryError::ProbeUnavailable("current pid unknown".to_string()))?;

        if !self.system.refresh_process(pid) {
            return Err(MemoryError::ProbeUnavailable(format!(
                "process {} not found",
                pid
            )));
        }
        let process = self
            .system
            .process(pid)
            .ok_or_else(|| MemoryError::ProbeUnavailable(format!("process {} not found", pid)))?;

        let rss = process.memory();
        let (heap_used, heap_total) = match allocator_stats() {
            Some(stats) => (stats.live_bytes as u64, stats.peak_bytes as u64),
            None => (rss, process.virtual_memory()),
        };

        Ok(RawMemory {
            rss,
            heap_total,
            heap_used,
            external: rss.saturating_sub(heap_used),
            array_buffers: 0,
        })
    }
}

// == Scripted Probe ==
/// Replays a fixed sequence of heap readings (in MB), repeating the last one.
///
/// Intended for tests and simulations of the monitor.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    readings: Vec<RawMemory>,
    next: usize,
}

impl ScriptedProbe {
    /// Readings where only `heap_used` varies.
    pub fn from_heap_mb(heap_used: &[f64]) -> Self {
        Self::new(heap_used.iter().map(|mb| raw_from_mb(*mb, 0.0)).collect())
    }

    pub fn new(readings: Vec<RawMemory>) -> Self {
        Self { readings, next: 0 }
    }
}

impl MemoryProbe for ScriptedProbe {
    fn read(&mut self) -> Result<RawMemory, MemoryError> {
        if self.readings.is_empty() {
            return Err(MemoryError::ProbeUnavailable("no scripted readings".to_string()));
        }
        let index = self.next.min(self.readings.len() - 1);
        self.next += 1;
        Ok(self.readings[index])
    }
}

/// Builds a reading from MB figures; RSS covers heap plus external.
pub fn raw_from_mb(heap_used: f64, external: f64) -> RawMemory {
    let mb = |v: f64| (v * 1024.0 * 1024.0).round() as u64;
    RawMemory {
        rss: mb(heap_used + external),
        heap_total: mb(heap_used),
        heap_used: mb(heap_used),
        external: mb(external),
        array_buffers: 0,
    }
}
