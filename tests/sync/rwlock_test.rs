/*!
 * Reader-Writer Lock Tests
 * Exclusion invariants and writer preference across every wait strategy
 */

use super::common::every_strategy;
use pretty_assertions::assert_eq;
use rtl_sync::{AtomicCounter, RwLock, RwLockState};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_readers_and_writers_every_strategy() {
    for config in every_strategy() {
        let lock = RwLock::with_config(0u64, config);
        let violations = AtomicCounter::new(0);

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..20 {
                        let value = lock.read();
                        let state = lock.state();
                        if state.writer_active != 0 || state.readers < 1 {
                            violations.fetch_add(1);
                        }
                        drop(value);
                    }
                });
            }
            for _ in 0..2 {
                s.spawn(|| {
                    for _ in 0..5 {
                        let mut value = lock.write();
                        let state = lock.state();
                        if state.readers != 0 || state.writer_active != 1 {
                            violations.fetch_add(1);
                        }
                        *value += 1;
                    }
                });
            }
        });

        assert_eq!(violations.load(), 0, "strategy {}", lock.strategy_name());
        assert_eq!(lock.state(), RwLockState::default());
        assert_eq!(lock.into_inner(), 10);
    }
}

#[test]
fn test_writer_excludes_readers() {
    let lock = Arc::new(RwLock::new(Vec::<u32>::new()));
    let writer = lock.write();

    let reader_lock = lock.clone();
    let reader = thread::spawn(move || reader_lock.read().len());

    thread::sleep(Duration::from_millis(50));
    assert_eq!(lock.state().readers, 0);

    let mut writer = writer;
    writer.push(1);
    writer.push(2);
    drop(writer);

    assert_eq!(reader.join().unwrap(), 2);
}

#[test]
fn test_writers_serialize() {
    let lock = Arc::new(RwLock::new(String::new()));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let lock = lock.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let mut text = lock.write();
                    text.push(char::from(b'a' + i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(lock.read().len(), 200);
}

#[test]
fn test_get_mut_skips_locking() {
    let mut lock = RwLock::new(1);
    *lock.get_mut() += 1;
    assert_eq!(*lock.read(), 2);
    assert!(lock.state().is_idle());
}
