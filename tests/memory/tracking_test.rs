/*!
 * Tracking Allocator Tests
 * Leak reports, byte limits and failure propagation into primitives
 */

use pretty_assertions::assert_eq;
use rtl_sync::memory::{AllocStats, Allocator, LeakRecord};
use rtl_sync::{BoundedQueue, MpmcQueue, SpscQueue, SyncError, TrackingAllocator};
use std::alloc::Layout;
use std::sync::Arc;

#[test]
fn test_every_queue_releases_its_buffer() {
    let tracker = Arc::new(TrackingAllocator::new());
    {
        let bounded = BoundedQueue::with_allocator(8, tracker.clone()).unwrap();
        let mut spsc = SpscQueue::with_allocator(8, tracker.clone()).unwrap();
        let mpmc = MpmcQueue::with_allocator(8, tracker.clone()).unwrap();

        bounded.try_enqueue(vec![1u8]).unwrap();
        spsc.try_enqueue(vec![2u8]).unwrap();
        mpmc.try_enqueue(vec![3u8]).unwrap();

        assert_eq!(tracker.stats().live_allocations, 3);
    }

    let stats = tracker.stats();
    assert_eq!(stats.live_allocations, 0);
    assert_eq!(stats.live_bytes, 0);
    assert_eq!(stats.total_allocations, 3);
    assert_eq!(tracker.report_leaks(), 0);
}

#[test]
fn test_leak_report_lists_live_blocks() {
    let tracker = TrackingAllocator::new();
    let layout = Layout::from_size_align(48, 16).unwrap();
    let ptr = tracker.allocate(layout).unwrap();

    let leaks = tracker.live_allocations();
    assert_eq!(
        leaks,
        vec![LeakRecord {
            address: ptr.as_ptr() as usize,
            size: 48,
            align: 16,
        }]
    );
    assert_eq!(tracker.report_leaks(), 1);

    unsafe { tracker.release(ptr, layout) };
    assert_eq!(tracker.report_leaks(), 0);
}

#[test]
fn test_limit_failure_leaves_no_partial_state() {
    let tracker = Arc::new(TrackingAllocator::with_limit(128));

    let first = SpscQueue::<u64>::with_allocator(7, tracker.clone()).unwrap();
    let err = MpmcQueue::<u64>::with_allocator(64, tracker.clone()).unwrap_err();

    assert_eq!(
        err,
        SyncError::AllocationFailed {
            bytes: 64 * 16,
            align: 8,
        }
    );
    assert_eq!(
        tracker.stats(),
        AllocStats {
            live_allocations: 1,
            live_bytes: 64,
            peak_bytes: 64,
            total_allocations: 1,
            failed_allocations: 1,
        }
    );

    drop(first);
    assert_eq!(tracker.stats().live_bytes, 0);
}

#[test]
fn test_wrapped_allocator_chain() {
    let outer_limit = Arc::new(TrackingAllocator::with_limit(1024));
    let inner = TrackingAllocator::wrap(outer_limit.clone(), None);

    let layout = Layout::array::<u32>(64).unwrap();
    let ptr = inner.allocate(layout).unwrap();
    assert_eq!(outer_limit.stats().live_bytes, 256);

    unsafe { inner.release(ptr, layout) };
    assert_eq!(outer_limit.stats().live_bytes, 0);
    assert_eq!(inner.report_leaks(), 0);
}
