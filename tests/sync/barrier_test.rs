/*!
 * Barrier Tests
 * Rendezvous and generation accounting across every wait strategy
 */

use super::common::every_strategy;
use pretty_assertions::assert_eq;
use rtl_sync::{AtomicCounter, Barrier, SyncError};
use std::thread;

#[test]
fn test_two_phases_every_strategy() {
    const PARTICIPANTS: usize = 8;

    for config in every_strategy() {
        let barrier = Barrier::with_config(PARTICIPANTS, config).unwrap();
        let arrived = AtomicCounter::new(0);
        let early = AtomicCounter::new(0);

        thread::scope(|s| {
            for _ in 0..PARTICIPANTS {
                s.spawn(|| {
                    arrived.fetch_add(1);
                    let first = barrier.wait();
                    if arrived.load() != PARTICIPANTS as isize {
                        early.fetch_add(1);
                    }
                    let second = barrier.wait();
                    assert_eq!(second.generation(), first.generation() + 1);
                });
            }
        });

        assert_eq!(early.load(), 0, "strategy {}", barrier.strategy_name());
        assert_eq!(barrier.generation(), 2);
        assert_eq!(barrier.arrived(), 0);
    }
}

#[test]
fn test_many_rounds_one_leader_each() {
    const PARTICIPANTS: usize = 4;
    const ROUNDS: usize = 50;

    let barrier = Barrier::new(PARTICIPANTS).unwrap();
    let leaders = AtomicCounter::new(0);

    thread::scope(|s| {
        for _ in 0..PARTICIPANTS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    if barrier.wait().is_leader() {
                        leaders.fetch_add(1);
                    }
                }
            });
        }
    });

    assert_eq!(leaders.load(), ROUNDS as isize);
    assert_eq!(barrier.generation(), ROUNDS as isize);
}

#[test]
fn test_partial_arrival_counts() {
    let barrier = Barrier::new(3).unwrap();
    assert_eq!(barrier.expected(), 3);

    thread::scope(|s| {
        let first = s.spawn(|| barrier.wait());
        while barrier.arrived() < 1 {
            thread::yield_now();
        }
        assert_eq!(barrier.generation(), 0);

        let second = s.spawn(|| barrier.wait());
        let third = barrier.wait();

        let results = [first.join().unwrap(), second.join().unwrap(), third];
        assert_eq!(results.iter().filter(|r| r.is_leader()).count(), 1);
        assert!(results.iter().all(|r| r.generation() == 0));
    });

    assert_eq!(barrier.generation(), 1);
}

#[test]
fn test_zero_participants() {
    assert_eq!(Barrier::new(0).unwrap_err(), SyncError::ZeroParticipants);
}

#[test]
fn test_participant_count_beyond_isize() {
    let err = Barrier::new(usize::MAX).unwrap_err();
    assert_eq!(
        err,
        SyncError::TooManyParticipants {
            participants: usize::MAX
        }
    );
    assert!(err.to_string().starts_with("Barrier cannot track"));
}
