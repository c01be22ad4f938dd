//! Manual memory reclaim capability.
//!
//! Rust has no collector to force, so a "GC pass" asks the allocator to hand
//! freed pages back to the OS. Platforms without such a hook get the
//! [`NoopReclaimer`] null object.

use std::fmt;

use crate::error::MemoryError;

/// Capability to release unused allocator memory on demand.
pub trait MemoryReclaimer: fmt::Debug + Send + Sync {
    /// Short identifier used in reports.
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool {
        true
    }

    fn reclaim(&self) -> Result<(), MemoryError>;
}

/// glibc `malloc_trim(0)`: releases free heap pages at the top of every arena.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct MallocTrim;

#[cfg(all(target_os = "linux", target_env = "gnu"))]
impl MemoryReclaimer for MallocTrim {
    fn name(&self) -> &'static str {
        "malloc_trim"
    }

    fn reclaim(&self) -> Result<(), MemoryError> {
        // SAFETY: malloc_trim only inspects allocator-internal state
        unsafe {
            libc::malloc_trim(0);
        }
        Ok(())
    }
}

/// Stand-in when the platform exposes no reclaim hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReclaimer;

impl MemoryReclaimer for NoopReclaimer {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn reclaim(&self) -> Result<(), MemoryError> {
        Err(MemoryError::ReclaimUnavailable(
            "allocator exposes no trim hook on this platform".to_string(),
        ))
    }
}

/// Best reclaimer for the build target.
pub fn platform_reclaimer() -> Box<dyn MemoryReclaimer> {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        Box::new(MallocTrim)
    }
    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    {
        Box::new(NoopReclaimer)
    }
}
