//! Counting global allocator.
//!
//! Wraps the system allocator and tracks live and peak heap bytes, giving the
//! monitor a "heap used" figure. Install it from the binary:
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: pastecache::memory::CountingAllocator = pastecache::memory::CountingAllocator;
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

static LIVE_BYTES: AtomicUsize = AtomicUsize::new(0);
static PEAK_BYTES: AtomicUsize = AtomicUsize::new(0);

/// System allocator with byte accounting.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingAllocator;

/// Snapshot of the allocator counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorStats {
    pub live_bytes: usize,
    pub peak_bytes: usize,
}

/// Current counters, or `None` when [`CountingAllocator`] is not installed.
pub fn allocator_stats() -> Option<AllocatorStats> {
    let peak_bytes = PEAK_BYTES.load(Ordering::Relaxed);
    if peak_bytes == 0 {
        return None;
    }
    Some(AllocatorStats {
        live_bytes: LIVE_BYTES.load(Ordering::Relaxed),
        peak_bytes,
    })
}

fn record_alloc(size: usize) {
    let live = LIVE_BYTES.fetch_add(size, Ordering::Relaxed) + size;
    PEAK_BYTES.fetch_max(live, Ordering::Relaxed);
}

fn record_dealloc(size: usize) {
    LIVE_BYTES.fetch_sub(size, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                record_alloc(new_size - old_size);
            } else {
                record_dealloc(old_size - new_size);
            }
        }
        new_ptr
    }
}
