/*!
 * Bounded Queue Tests
 * Sequential contract, concurrent producers/consumers, allocator failures
 */

use pretty_assertions::assert_eq;
use rtl_sync::{BoundedQueue, SyncError, TrackingAllocator};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_capacity_three_sequence() {
    let queue = BoundedQueue::new(3).unwrap();

    assert!(queue.try_enqueue(1).is_ok());
    assert!(queue.try_enqueue(2).is_ok());
    assert!(queue.try_enqueue(3).is_ok());

    let rejected = queue.try_enqueue(4).unwrap_err();
    assert_eq!(rejected.into_inner(), 4);
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.try_dequeue(), Some(1));
    assert_eq!(queue.try_dequeue(), Some(2));
    assert_eq!(queue.try_dequeue(), Some(3));
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn test_full_leaves_state_untouched() {
    let queue = BoundedQueue::new(2).unwrap();
    queue.try_enqueue("a").unwrap();
    queue.try_enqueue("b").unwrap();

    for _ in 0..5 {
        assert!(queue.try_enqueue("x").is_err());
    }

    assert_eq!(queue.try_dequeue(), Some("a"));
    assert_eq!(queue.try_dequeue(), Some("b"));
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        BoundedQueue::<u32>::new(0).unwrap_err(),
        SyncError::ZeroCapacity
    );
}

#[test]
fn test_producers_and_consumers() {
    const PRODUCERS: usize = 3;
    const PER_PRODUCER: usize = 50;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(BoundedQueue::new(100).unwrap());
    let consumed = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let mut item = p * PER_PRODUCER + i;
                    while let Err(full) = queue.try_enqueue(item) {
                        item = full.into_inner();
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..2)
        .map(|_| {
            let queue = queue.clone();
            let consumed = consumed.clone();
            thread::spawn(move || {
                let mut got = Vec::new();
                while consumed.load(Ordering::SeqCst) < TOTAL {
                    match queue.try_dequeue() {
                        Some(item) => {
                            consumed.fetch_add(1, Ordering::SeqCst);
                            got.push(item);
                        }
                        None => thread::yield_now(),
                    }
                }
                got
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    let mut seen = HashSet::new();
    for consumer in consumers {
        for item in consumer.join().unwrap() {
            assert!(seen.insert(item), "item {item} consumed twice");
        }
    }
    assert_eq!(seen.len(), TOTAL);
    assert!(queue.is_empty());
}

#[test]
fn test_per_producer_order_preserved() {
    let queue = Arc::new(BoundedQueue::new(8).unwrap());

    let producers: Vec<_> = (0..2u32)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..200u32 {
                    let mut item = (p, i);
                    while let Err(full) = queue.try_enqueue(item) {
                        item = full.into_inner();
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    let mut last = [None::<u32>; 2];
    let mut received = 0;
    while received < 400 {
        if let Some((p, i)) = queue.try_dequeue() {
            if let Some(prev) = last[p as usize] {
                assert!(i > prev, "producer {p} reordered: {i} after {prev}");
            }
            last[p as usize] = Some(i);
            received += 1;
        }
    }

    for producer in producers {
        producer.join().unwrap();
    }
}

#[test]
fn test_allocation_failure_propagates() {
    let tracker = Arc::new(TrackingAllocator::with_limit(64));
    let err = BoundedQueue::<u64>::with_allocator(1024, tracker.clone()).unwrap_err();

    assert!(matches!(err, SyncError::AllocationFailed { .. }));
    assert_eq!(tracker.stats().failed_allocations, 1);
    assert_eq!(tracker.stats().live_allocations, 0);
}
