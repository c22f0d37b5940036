/*!
 * MPMC Queue Tests
 * No loss, no duplication, per-producer order, capacity edge cases
 */

use pretty_assertions::assert_eq;
use rtl_sync::{MpmcQueue, SyncError, TrackingAllocator};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_many_producers_many_consumers() {
    const PRODUCERS: usize = 6;
    const CONSUMERS: usize = 6;
    const PER_PRODUCER: usize = 5_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(MpmcQueue::new(16).unwrap());
    let consumed = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    let mut item = (p, i);
                    while let Err(full) = queue.try_enqueue(item) {
                        item = full.into_inner();
                        thread::yield_now();
                    }
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
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

    let mut per_producer: HashMap<usize, Vec<usize>> = HashMap::new();
    for consumer in consumers {
        // Each consumer sees every producer's items in increasing order
        let mut last: HashMap<usize, usize> = HashMap::new();
        for (p, i) in consumer.join().unwrap() {
            if let Some(prev) = last.insert(p, i) {
                assert!(i > prev, "consumer saw producer {p} out of order");
            }
            per_producer.entry(p).or_default().push(i);
        }
    }

    assert_eq!(per_producer.len(), PRODUCERS);
    for (_, mut items) in per_producer {
        items.sort_unstable();
        assert_eq!(items, (0..PER_PRODUCER).collect::<Vec<_>>());
    }
    assert!(queue.is_empty());
}

#[test]
fn test_full_and_empty_reporting() {
    let queue = MpmcQueue::new(2).unwrap();
    assert_eq!(queue.try_dequeue(), None::<u8>);

    queue.try_enqueue(1).unwrap();
    queue.try_enqueue(2).unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.try_enqueue(3).unwrap_err().into_inner(), 3);

    assert_eq!(queue.try_dequeue(), Some(1));
    queue.try_enqueue(3).unwrap();
    assert_eq!(queue.try_dequeue(), Some(2));
    assert_eq!(queue.try_dequeue(), Some(3));
    assert_eq!(queue.try_dequeue(), None);
}

#[test]
fn test_capacity_one_under_contention() {
    let queue = Arc::new(MpmcQueue::new(1).unwrap());
    let total = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let queue = queue.clone();
            let total = total.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let mut item = t * 1000 + i;
                    while let Err(full) = queue.try_enqueue(item) {
                        item = full.into_inner();
                        if let Some(value) = queue.try_dequeue() {
                            total.fetch_add(value, Ordering::SeqCst);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    while let Some(value) = queue.try_dequeue() {
        total.fetch_add(value, Ordering::SeqCst);
    }

    let expected: usize = (0..4)
        .flat_map(|t| (0..500).map(move |i| t * 1000 + i))
        .sum();
    assert_eq!(total.load(Ordering::SeqCst), expected);
}

#[test]
fn test_zero_capacity_and_allocation_failure() {
    assert_eq!(
        MpmcQueue::<u8>::new(0).unwrap_err(),
        SyncError::ZeroCapacity
    );

    let tracker = Arc::new(TrackingAllocator::with_limit(8));
    let err = MpmcQueue::<u64>::with_allocator(16, tracker).unwrap_err();
    assert!(matches!(err, SyncError::AllocationFailed { .. }));
}
