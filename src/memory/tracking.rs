/*!
 * Tracking Allocator
 * Records live allocations, enforces an optional byte limit, reports leaks
 */

use super::global::Global;
use super::traits::Allocator;
use super::types::{AllocError, AllocResult, AllocStats, LeakRecord};
use dashmap::DashMap;
use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Allocator wrapper that keeps a ledger of every live block
///
/// Useful for leak checks in tests and for injecting allocation failures
/// with a byte limit.
///
/// # Example
///
/// ```
/// use rtl_sync::memory::TrackingAllocator;
/// use rtl_sync::BoundedQueue;
/// use std::sync::Arc;
///
/// let tracker = Arc::new(TrackingAllocator::new());
/// {
///     let _queue = BoundedQueue::<u32>::with_allocator(8, tracker.clone()).unwrap();
///     assert_eq!(tracker.stats().live_allocations, 1);
/// }
/// assert_eq!(tracker.report_leaks(), 0);
/// ```
pub struct TrackingAllocator {
    inner: Arc<dyn Allocator>,
    live: DashMap<usize, Layout>,
    limit: Option<usize>,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    total_allocations: AtomicU64,
    failed_allocations: AtomicU64,
}

impl TrackingAllocator {
    /// Track allocations served by the process allocator
    pub fn new() -> Self {
        Self::wrap(Global::shared(), None)
    }

    /// Track allocations and refuse any request that would push live bytes past `limit`
    pub fn with_limit(limit: usize) -> Self {
        Self::wrap(Global::shared(), Some(limit))
    }

    /// Track allocations served by another allocator
    pub fn wrap(inner: Arc<dyn Allocator>, limit: Option<usize>) -> Self {
        Self {
            inner,
            live: DashMap::new(),
            limit,
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            total_allocations: AtomicU64::new(0),
            failed_allocations: AtomicU64::new(0),
        }
    }

    /// Current statistics snapshot
    pub fn stats(&self) -> AllocStats {
        AllocStats {
            live_allocations: self.live.len(),
            live_bytes: self.live_bytes.load(Ordering::SeqCst),
            peak_bytes: self.peak_bytes.load(Ordering::SeqCst),
            total_allocations: self.total_allocations.load(Ordering::Relaxed),
            failed_allocations: self.failed_allocations.load(Ordering::Relaxed),
        }
    }

    /// Blocks that are currently allocated
    pub fn live_allocations(&self) -> Vec<LeakRecord> {
        let mut records: Vec<LeakRecord> = self
            .live
            .iter()
            .map(|entry| LeakRecord {
                address: *entry.key(),
                size: entry.value().size(),
                align: entry.value().align(),
            })
            .collect();
        records.sort_by_key(|r| r.address);
        records
    }

    /// Log every block still allocated and return how many there are
    ///
    /// Call once all primitives built on this allocator have been dropped.
    pub fn report_leaks(&self) -> usize {
        let leaks = self.live_allocations();
        for leak in &leaks {
            warn!(
                address = format_args!("0x{:x}", leak.address),
                size = leak.size,
                align = leak.align,
                "Leaked allocation"
            );
        }
        leaks.len()
    }

    /// Commit `size` bytes only if they fit under the limit
    fn reserve(&self, size: usize) -> bool {
        let limit = self.limit.unwrap_or(usize::MAX);
        let reserved = self
            .live_bytes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                used.checked_add(size).filter(|&total| total <= limit)
            });

        match reserved {
            Ok(used) => {
                self.peak_bytes.fetch_max(used + size, Ordering::SeqCst);
                true
            }
            Err(_) => false,
        }
    }
}

impl Default for TrackingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for TrackingAllocator {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        if !self.reserve(layout.size()) {
            self.failed_allocations.fetch_add(1, Ordering::Relaxed);
            debug!(
                size = layout.size(),
                limit = ?self.limit,
                "Allocation refused by byte limit"
            );
            return Err(AllocError::for_layout(layout));
        }

        match self.inner.allocate(layout) {
            Ok(ptr) => {
                self.live.insert(ptr.as_ptr() as usize, layout);
                self.total_allocations.fetch_add(1, Ordering::Relaxed);
                Ok(ptr)
            }
            Err(err) => {
                self.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
                self.failed_allocations.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        if self.live.remove(&(ptr.as_ptr() as usize)).is_some() {
            self.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
        } else {
            warn!(
                address = format_args!("0x{:x}", ptr.as_ptr() as usize),
                "Release of an untracked block"
            );
        }
        self.inner.release(ptr, layout);
    }

    fn name(&self) -> &'static str {
        "tracking"
    }
}
