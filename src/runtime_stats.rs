// Heap statistics for this process.
// `alloc` and `sys` come from jemalloc's own counters (`stats.allocated`, `stats.mapped`).
// jemalloc keeps no cumulative "bytes ever allocated" figure, so `total_alloc` is counted by
// `TotalAlloc`, a thin GlobalAlloc wrapper the binary installs around `Jemalloc`. Binaries
// that don't install it (test harnesses, embedders) read 0 for `total_alloc`.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::atomic::{AtomicU64, Ordering};

use tikv_jemalloc_ctl::{epoch, stats};

use crate::models::RuntimeStats;

static TOTAL_ALLOCATED: AtomicU64 = AtomicU64::new(0);

/// Forwards to `inner` and adds every successful allocation size to a process-wide total.
pub struct TotalAlloc<A> {
    inner: A,
}

impl<A> TotalAlloc<A> {
    pub const fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[inline]
fn add_total(size: usize) {
    TOTAL_ALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
}

// SAFETY: every call is forwarded unchanged to `inner`; the wrapper only bumps an atomic
// counter and never touches the returned memory.
unsafe impl<A: GlobalAlloc> GlobalAlloc for TotalAlloc<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc(layout) };
        if !ptr.is_null() {
            add_total(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };
        if !ptr.is_null() {
            add_total(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { self.inner.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && new_size > layout.size() {
            add_total(new_size - layout.size());
        }
        new_ptr
    }
}

/// Cumulative bytes handed out through `TotalAlloc`.
pub fn total_allocated() -> u64 {
    TOTAL_ALLOCATED.load(Ordering::Relaxed)
}

/// Reads heap statistics. Advances the jemalloc epoch first so the cached stats are fresh.
pub fn read() -> anyhow::Result<RuntimeStats> {
    epoch::advance().map_err(|e| anyhow::anyhow!("jemalloc epoch advance failed: {}", e))?;
    let allocated =
        stats::allocated::read().map_err(|e| anyhow::anyhow!("jemalloc stats.allocated: {}", e))?;
    let mapped =
        stats::mapped::read().map_err(|e| anyhow::anyhow!("jemalloc stats.mapped: {}", e))?;
    Ok(RuntimeStats {
        alloc: allocated as u64,
        total_alloc: total_allocated(),
        sys: mapped as u64,
        num_gc: 0,
    })
}
