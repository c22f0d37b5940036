/*!
 * Wait Queue
 *
 * Per-primitive wait/notify point. Blocked threads sleep until another
 * thread changes the state they wait on and calls `notify_all`.
 *
 * # Design: Enum Dispatch for Zero-Cost Abstraction
 *
 * Instead of `Arc<dyn Trait>`, the strategy is an enum so every call is
 * monomorphized and inlined; the trait stays available for custom
 * strategies and testing.
 *
 * # Protocol
 *
 * Waiter: register in `waiters`, then let the strategy validate the
 * condition and block. Waker: publish the state change, then
 * `notify_all`. All of these are `SeqCst`, so a waker that sees no
 * registered waiter is ordered before the waiter's validation, which then
 * sees the new state.
 */

use super::condvar::CondvarWait;
use super::config::{StrategyType, SyncConfig};
use super::futex::FutexWait;
use super::poll::PollWait;
use super::spinwait::SpinWait;
use super::traits::{WaitStrategy, WakeResult};
use crate::sync::atomic::AtomicCounter;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result type for wait operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Wait operation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("Wait operation timed out")]
    Timeout,
}

/// Wait strategy implementation (enum dispatch for zero overhead)
enum WaitStrategyImpl {
    Futex(FutexWait),
    Condvar(CondvarWait),
    SpinWait(SpinWait),
    Poll(PollWait),
}

impl WaitStrategyImpl {
    #[inline(always)]
    fn wait(&self, key: usize, should_block: &dyn Fn() -> bool, timeout: Option<Duration>) -> bool {
        match self {
            Self::Futex(s) => s.wait(key, should_block, timeout),
            Self::Condvar(s) => s.wait(key, should_block, timeout),
            Self::SpinWait(s) => s.wait(key, should_block, timeout),
            Self::Poll(s) => s.wait(key, should_block, timeout),
        }
    }

    #[inline(always)]
    fn wake_one(&self, key: usize) -> WakeResult {
        match self {
            Self::Futex(s) => s.wake_one(key),
            Self::Condvar(s) => s.wake_one(key),
            Self::SpinWait(s) => s.wake_one(key),
            Self::Poll(s) => s.wake_one(key),
        }
    }

    #[inline(always)]
    fn wake_all(&self, key: usize) -> WakeResult {
        match self {
            Self::Futex(s) => s.wake_all(key),
            Self::Condvar(s) => s.wake_all(key),
            Self::SpinWait(s) => s.wake_all(key),
            Self::Poll(s) => s.wake_all(key),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Futex(s) => s.name(),
            Self::Condvar(s) => s.name(),
            Self::SpinWait(s) => s.name(),
            Self::Poll(s) => s.name(),
        }
    }
}

/// Condition-based wait queue
///
/// Each blocking primitive embeds one. The queue's own waiter counter
/// doubles as its parking key, so keys are unique per live queue.
///
/// # Examples
///
/// ```
/// use rtl_sync::sync::{SyncConfig, WaitQueue};
/// use rtl_sync::AtomicCounter;
/// use std::time::Duration;
///
/// let queue = WaitQueue::new(SyncConfig::default());
/// let ready = AtomicCounter::new(0);
///
/// std::thread::scope(|s| {
///     s.spawn(|| {
///         ready.store(1);
///         queue.notify_all();
///     });
///     queue.block_while(|| ready.load() == 0);
/// });
///
/// // Nobody will change the condition, so a timed wait gives up
/// assert!(queue.wait_while(Some(Duration::from_millis(10)), || true).is_err());
/// ```
pub struct WaitQueue {
    strategy: WaitStrategyImpl,
    waiters: AtomicCounter,
}

impl WaitQueue {
    /// Create a new wait queue with the specified configuration
    pub fn new(config: SyncConfig) -> Self {
        let strategy = match config.select_strategy() {
            StrategyType::Condvar => WaitStrategyImpl::Condvar(CondvarWait::new()),
            StrategyType::SpinWait => {
                WaitStrategyImpl::SpinWait(SpinWait::new(config.spin_duration, config.max_spins))
            }
            StrategyType::Poll => WaitStrategyImpl::Poll(PollWait::new(config.poll_interval)),
            // Auto is resolved by select_strategy
            StrategyType::Futex | StrategyType::Auto => WaitStrategyImpl::Futex(FutexWait::new()),
        };

        Self {
            strategy,
            waiters: AtomicCounter::new(0),
        }
    }

    /// Create with default configuration (auto-selects best strategy)
    pub fn with_defaults() -> Self {
        Self::new(SyncConfig::default())
    }

    /// Create optimized for low-latency waits
    pub fn low_latency() -> Self {
        Self::new(SyncConfig::low_latency())
    }

    /// Create optimized for long waits
    pub fn long_wait() -> Self {
        Self::new(SyncConfig::long_wait())
    }

    #[inline(always)]
    fn key(&self) -> usize {
        self.waiters.addr()
    }

    /// Block while `condition` holds, or until `timeout` expires
    ///
    /// The condition is checked before blocking and after every wake, so
    /// it must read state that wakers update before calling `notify_*`.
    pub fn wait_while<F>(&self, timeout: Option<Duration>, condition: F) -> WaitResult<()>
    where
        F: Fn() -> bool,
    {
        let start = Instant::now();

        loop {
            if !condition() {
                return Ok(());
            }

            let remaining = match timeout {
                Some(timeout) => {
                    let elapsed = start.elapsed();
                    if elapsed >= timeout {
                        return Err(WaitError::Timeout);
                    }
                    Some(timeout - elapsed)
                }
                None => None,
            };

            self.waiters.fetch_add(1);
            self.strategy.wait(self.key(), &condition, remaining);
            self.waiters.fetch_sub(1);
        }
    }

    /// Block while `condition` holds, with no timeout
    #[inline]
    pub fn block_while<F>(&self, condition: F)
    where
        F: Fn() -> bool,
    {
        // Cannot time out without a deadline
        let _ = self.wait_while(None, condition);
    }

    /// Wake one blocked thread
    ///
    /// Strategies that share parking slots between keys may wake more.
    #[inline]
    pub fn notify_one(&self) -> WakeResult {
        if self.waiters.load() == 0 {
            return WakeResult::NoWaiters;
        }
        self.strategy.wake_one(self.key())
    }

    /// Wake every blocked thread
    #[inline]
    pub fn notify_all(&self) -> WakeResult {
        if self.waiters.load() == 0 {
            return WakeResult::NoWaiters;
        }
        self.strategy.wake_all(self.key())
    }

    /// Threads currently inside a wait (diagnostics only)
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load().max(0) as usize
    }

    /// Get the name of the active strategy
    #[inline]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for WaitQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitQueue")
            .field("strategy", &self.strategy_name())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
