/*!
 * Futex-Based Wait Strategy
 *
 * Uses parking_lot_core for futex-like operations on all platforms.
 * The parking lot keeps one global hash table of queues keyed by address,
 * so this strategy carries no state of its own.
 *
 * The `should_block` predicate runs as the park validation callback,
 * under the bucket lock that `unpark_*` also takes.
 */

use super::traits::{WaitStrategy, WakeResult};
use parking_lot_core::{park, unpark_all, unpark_one, ParkResult, ParkToken, UnparkToken};
use std::time::{Duration, Instant};

/// Futex-style wait strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct FutexWait;

impl FutexWait {
    pub const fn new() -> Self {
        Self
    }
}

impl WaitStrategy for FutexWait {
    fn wait(
        &self,
        key: usize,
        should_block: &dyn Fn() -> bool,
        timeout: Option<Duration>,
    ) -> bool {
        let deadline = timeout.map(|d| Instant::now() + d);

        // SAFETY: key is an address owned by the waiting primitive; none of
        // the callbacks call back into the parking lot or panic
        let result = unsafe {
            park(
                key,
                || should_block(),
                || {},
                |_key, _was_last| {},
                ParkToken(0),
                deadline,
            )
        };

        match result {
            ParkResult::Unparked(_) => true,
            // Validation failed: the condition already changed
            ParkResult::Invalid => true,
            ParkResult::TimedOut => false,
        }
    }

    fn wake_one(&self, key: usize) -> WakeResult {
        // SAFETY: the callback does not touch the parking lot
        let result = unsafe { unpark_one(key, |_| UnparkToken(0)) };
        WakeResult::from_count(result.unparked_threads)
    }

    fn wake_all(&self, key: usize) -> WakeResult {
        // SAFETY: key is a plain address, no callback involved
        let unparked = unsafe { unpark_all(key, UnparkToken(0)) };
        WakeResult::from_count(unparked)
    }

    fn name(&self) -> &'static str {
        "futex"
    }
}
