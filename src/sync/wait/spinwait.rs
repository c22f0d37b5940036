/*!
 * Adaptive Spin-Wait Strategy with Exponential Backoff
 *
 * Optimized for waits that are usually very short:
 *
 * 1. **Tight spin phase**: just `spin_loop()` hint
 * 2. **Yield phase**: `yield_now()` every iteration
 * 3. **Sleep phase**: exponentially increasing sleep, capped
 *
 * When the spin budget runs out the waiter parks on the futex strategy,
 * which also serves every wake.
 */

use super::futex::FutexWait;
use super::traits::{WaitStrategy, WakeResult};
use crate::limits::{MAX_SPIN_BACKOFF, SPIN_PHASE_ITERATIONS, YIELD_PHASE_ITERATIONS};
use std::thread;
use std::time::{Duration, Instant};

/// Adaptive spin-wait strategy with exponential backoff
#[derive(Debug, Clone)]
pub struct SpinWait {
    fallback: FutexWait,
    spin_duration: Duration,
    max_spins: u32,
}

impl SpinWait {
    pub fn new(spin_duration: Duration, max_spins: u32) -> Self {
        Self {
            fallback: FutexWait::new(),
            spin_duration,
            max_spins,
        }
    }

    /// Create with default parameters (optimized for <100µs waits)
    pub fn with_defaults() -> Self {
        Self::new(Duration::from_micros(50), 500)
    }

    /// Spin until `done` holds or the budget is spent
    ///
    /// Returns true if `done` was observed.
    fn spin(&self, budget: Duration, done: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        let mut spin_count = 0u32;
        let mut backoff = Duration::from_nanos(1);

        loop {
            if done() {
                return true;
            }

            if start.elapsed() >= budget || spin_count >= self.max_spins {
                return false;
            }

            if spin_count < SPIN_PHASE_ITERATIONS {
                std::hint::spin_loop();
            } else if spin_count < YIELD_PHASE_ITERATIONS {
                thread::yield_now();
            } else {
                thread::sleep(backoff);
                backoff = (backoff * 2).min(MAX_SPIN_BACKOFF);
            }

            spin_count += 1;
        }
    }
}

impl Default for SpinWait {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl WaitStrategy for SpinWait {
    fn wait(
        &self,
        key: usize,
        should_block: &dyn Fn() -> bool,
        timeout: Option<Duration>,
    ) -> bool {
        let start = Instant::now();
        let budget = timeout.map_or(self.spin_duration, |t| t.min(self.spin_duration));

        if self.spin(budget, || !should_block()) {
            return true;
        }

        let remaining = match timeout {
            Some(timeout) => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    return false;
                }
                Some(timeout - elapsed)
            }
            None => None,
        };

        self.fallback.wait(key, should_block, remaining)
    }

    fn wake_one(&self, key: usize) -> WakeResult {
        self.fallback.wake_one(key)
    }

    fn wake_all(&self, key: usize) -> WakeResult {
        self.fallback.wake_all(key)
    }

    fn name(&self) -> &'static str {
        "spinwait"
    }
}
