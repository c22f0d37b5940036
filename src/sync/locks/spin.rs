/*!
 * Spinlock Backend
 * Test-and-test-and-set raw mutex for very short critical sections
 */

use crate::limits::SPIN_LOCK_YIELD_THRESHOLD;
use parking_lot::lock_api::{GuardSend, RawMutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Raw spinlock usable as a `Mutex` backend
///
/// Contended acquirers spin on a plain load until the lock looks free and
/// only then attempt the swap, so waiting threads do not bounce the cache
/// line. After `SPIN_LOCK_YIELD_THRESHOLD` failed rounds they start
/// yielding to the scheduler between attempts.
pub struct SpinRawMutex {
    locked: AtomicBool,
}

impl SpinRawMutex {
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }
}

impl Default for SpinRawMutex {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl RawMutex for SpinRawMutex {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();

    type GuardMarker = GuardSend;

    fn lock(&self) {
        let mut rounds = 0u32;
        while !self.try_lock() {
            while self.locked.load(Ordering::Relaxed) {
                if rounds < SPIN_LOCK_YIELD_THRESHOLD {
                    std::hint::spin_loop();
                    rounds += 1;
                } else {
                    thread::yield_now();
                }
            }
        }
    }

    #[inline]
    fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    unsafe fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    #[inline]
    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}
