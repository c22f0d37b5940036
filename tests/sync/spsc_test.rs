/*!
 * SPSC Queue Tests
 */

use pretty_assertions::assert_eq;
use rtl_sync::{SpscQueue, SyncError, TrackingAllocator};
use std::sync::Arc;
use std::thread;

#[test]
fn test_ordered_transfer() {
    const ITEMS: u32 = 100;

    let mut queue = SpscQueue::new(8).unwrap();
    let (mut producer, mut consumer) = queue.split();

    let received = thread::scope(|s| {
        s.spawn(move || {
            for i in 0..ITEMS {
                let mut item = i;
                while let Err(full) = producer.try_enqueue(item) {
                    item = full.into_inner();
                    thread::yield_now();
                }
            }
        });

        let mut received = Vec::with_capacity(ITEMS as usize);
        while received.len() < ITEMS as usize {
            match consumer.try_dequeue() {
                Some(item) => received.push(item),
                None => thread::yield_now(),
            }
        }
        received
    });

    assert_eq!(received, (0..ITEMS).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

#[test]
fn test_halves_report_shared_state() {
    let mut queue = SpscQueue::new(2).unwrap();
    let (mut producer, consumer) = queue.split();

    producer.try_enqueue('a').unwrap();
    assert_eq!(consumer.len(), 1);
    producer.try_enqueue('b').unwrap();
    assert!(producer.is_full());
    assert_eq!(producer.try_enqueue('c').unwrap_err().into_inner(), 'c');
    assert_eq!(consumer.capacity(), 2);
}

#[test]
fn test_zero_capacity_rejected() {
    assert_eq!(
        SpscQueue::<u8>::new(0).unwrap_err(),
        SyncError::ZeroCapacity
    );
}

#[test]
fn test_buffer_released() {
    let tracker = Arc::new(TrackingAllocator::new());
    {
        let mut queue = SpscQueue::with_allocator(4, tracker.clone()).unwrap();
        queue.try_enqueue(String::from("pending")).unwrap();
        // Ring keeps one spare slot
        assert_eq!(tracker.stats().live_bytes, 5 * std::mem::size_of::<String>());
    }
    assert_eq!(tracker.report_leaks(), 0);
}
