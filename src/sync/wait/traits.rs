/*!
 * Wait Strategy Traits
 *
 * Core abstraction for wait/notify with interchangeable backends.
 *
 * # Design: Validated Waits
 *
 * A waiter hands the strategy a `should_block` predicate. The strategy
 * evaluates it at a point that is ordered against every wake on the same
 * key (inside the futex bucket lock, under the condvar slot mutex, ...).
 * A state change published before the matching wake is therefore either
 * seen by the predicate or followed by a wake that finds the waiter
 * parked, so wakeups cannot be lost.
 */

use std::time::Duration;

/// Result of a wake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Successfully woke N waiters (N >= 1)
    Woken(usize),
    /// No waiters were waiting
    NoWaiters,
}

impl WakeResult {
    /// Check if any waiters were woken
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    /// Get number of woken waiters (0 if none)
    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }
}

/// Strategy for blocking a thread until it is woken
///
/// Keys are addresses owned by the waiting primitive, so distinct
/// primitives never share a key.
///
/// Implementations must be:
/// - **Thread-safe**: Safe to call from multiple threads
/// - **Lossless**: A wake issued after the predicate's state changed must
///   not be missed by a waiter that validated before the change
pub trait WaitStrategy: Send + Sync {
    /// Block on `key` if `should_block` still holds
    ///
    /// Returns `false` only when `timeout` expired. Returning `true` does
    /// not mean the condition changed: callers re-check and loop, since
    /// spurious returns are allowed.
    fn wait(&self, key: usize, should_block: &dyn Fn() -> bool, timeout: Option<Duration>)
        -> bool;

    /// Wake at least one waiter blocked on `key`
    fn wake_one(&self, key: usize) -> WakeResult;

    /// Wake every waiter blocked on `key`
    fn wake_all(&self, key: usize) -> WakeResult;

    /// Get strategy name for debugging
    fn name(&self) -> &'static str;
}
