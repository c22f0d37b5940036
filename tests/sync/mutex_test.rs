/*!
 * Mutex and AtomicCounter Tests
 */

use pretty_assertions::assert_eq;
use rtl_sync::{AtomicCounter, Mutex, SpinRawMutex};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_atomic_counter_operations() {
    let counter = AtomicCounter::new(10);

    assert_eq!(counter.fetch_add(5), 10);
    assert_eq!(counter.fetch_sub(3), 15);
    assert_eq!(counter.load(), 12);

    assert_eq!(counter.compare_exchange(12, 20), 12);
    assert_eq!(counter.compare_exchange(12, 30), 20);
    assert!(!counter.compare_exchange_bool(12, 40));
    assert!(counter.compare_exchange_bool(20, 40));

    counter.store(-1);
    assert_eq!(counter.load(), -1);
}

#[test]
fn test_atomic_counter_wraps() {
    let counter = AtomicCounter::new(isize::MAX);
    counter.fetch_add(1);
    assert_eq!(counter.load(), isize::MIN);
}

#[test]
fn test_mutex_protects_compound_update() {
    let pair = Arc::new(Mutex::new((0u64, 0u64)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pair = pair.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let mut guard = pair.lock();
                    guard.0 += 1;
                    thread::yield_now();
                    guard.1 += 1;
                    assert_eq!(guard.0, guard.1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(*pair.lock(), (4000, 4000));
}

#[test]
fn test_spin_backend_mutual_exclusion() {
    let total = Arc::new(Mutex::with_raw(SpinRawMutex::new(), 0usize));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let total = total.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    *total.lock() += 1;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(*total.lock(), 8_000);
}

#[test]
fn test_mutex_is_not_reentrant() {
    let mutex = Arc::new(Mutex::new(()));

    // The owner relocking must deadlock; the thread is left parked
    let (tx, rx) = mpsc::channel();
    let owner = mutex.clone();
    thread::spawn(move || {
        let _first = owner.lock();
        let _second = owner.lock();
        let _ = tx.send(());
    });

    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert!(mutex.is_locked());
}

#[test]
fn test_held_lock_blocks_other_threads() {
    let mutex = Arc::new(Mutex::new(()));
    let guard = mutex.lock();

    // A second acquisition blocks until the first guard is gone
    let (tx, rx) = mpsc::channel();
    let contender = mutex.clone();
    let handle = thread::spawn(move || {
        let _guard = contender.lock();
        tx.send(()).unwrap();
    });

    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(mutex.is_locked());

    drop(guard);
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    handle.join().unwrap();
    assert!(!mutex.is_locked());
}
