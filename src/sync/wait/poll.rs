/*!
 * Polling Wait Strategy
 *
 * Sleeps a fixed interval between condition checks and ignores wakes.
 * Wake latency is bounded by the interval instead of the waker; kept for
 * environments where parking is undesirable and as a baseline.
 */

use super::traits::{WaitStrategy, WakeResult};
use std::thread;
use std::time::Duration;

/// Fixed-interval polling strategy
#[derive(Debug, Clone, Copy)]
pub struct PollWait {
    interval: Duration,
}

impl PollWait {
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl WaitStrategy for PollWait {
    fn wait(
        &self,
        _key: usize,
        should_block: &dyn Fn() -> bool,
        timeout: Option<Duration>,
    ) -> bool {
        if !should_block() {
            return true;
        }

        match timeout {
            Some(timeout) if timeout <= self.interval => {
                thread::sleep(timeout);
                false
            }
            _ => {
                thread::sleep(self.interval);
                true
            }
        }
    }

    fn wake_one(&self, _key: usize) -> WakeResult {
        WakeResult::NoWaiters
    }

    fn wake_all(&self, _key: usize) -> WakeResult {
        WakeResult::NoWaiters
    }

    fn name(&self) -> &'static str {
        "poll"
    }
}
