/*!
 * Condvar-Based Wait Strategy with Sharded Slots
 *
 * Cross-platform fallback using parking_lot::Condvar for reliability.
 *
 * # Design: Fixed Global Slot Array
 *
 * Keys hash into a fixed, statically allocated array of condvar slots.
 * - Zero allocations, stable addresses (required for condvar)
 * - O(1) lookup via hash and mask
 * - No per-primitive footprint
 *
 * Several keys may share a slot. A targeted `notify_one` could then wake
 * the waiter of an unrelated key and leave the intended one asleep, so
 * both wake operations notify the whole slot; waiters re-check their
 * condition under the slot mutex and keep sleeping while it holds.
 */

use super::traits::{WaitStrategy, WakeResult};
use crate::limits::CONDVAR_PARKING_SLOTS;
use parking_lot::{const_mutex, Condvar, Mutex};
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const SLOT_MASK: usize = CONDVAR_PARKING_SLOTS - 1;

/// A single condvar slot with waiter count
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
struct CondvarSlot {
    condvar: Condvar,
    mutex: Mutex<()>,
    waiters: AtomicUsize,
}

impl CondvarSlot {
    const fn new() -> Self {
        Self {
            condvar: Condvar::new(),
            mutex: const_mutex(()),
            waiters: AtomicUsize::new(0),
        }
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: CondvarSlot = CondvarSlot::new();

static SLOTS: [CondvarSlot; CONDVAR_PARKING_SLOTS] = [EMPTY_SLOT; CONDVAR_PARKING_SLOTS];

/// Hash key to slot
#[inline]
fn slot_for(key: usize) -> &'static CondvarSlot {
    // Fixed seeds: waiters and wakers must agree on the slot
    let hasher = ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    );
    let mut state = hasher.build_hasher();
    key.hash(&mut state);
    &SLOTS[(state.finish() as usize) & SLOT_MASK]
}

/// Condvar-based wait strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct CondvarWait;

impl CondvarWait {
    pub const fn new() -> Self {
        Self
    }
}

impl WaitStrategy for CondvarWait {
    fn wait(
        &self,
        key: usize,
        should_block: &dyn Fn() -> bool,
        timeout: Option<Duration>,
    ) -> bool {
        let slot = slot_for(key);
        let deadline = timeout.map(|d| Instant::now() + d);

        slot.waiters.fetch_add(1, Ordering::SeqCst);
        let mut guard = slot.mutex.lock();

        // Checked under the slot mutex, which every wake also takes.
        // Wakes meant for other keys in this slot fall through the loop.
        let mut timed_out = false;
        while should_block() {
            match deadline {
                Some(deadline) => {
                    if slot.condvar.wait_until(&mut guard, deadline).timed_out() {
                        timed_out = true;
                        break;
                    }
                }
                None => slot.condvar.wait(&mut guard),
            }
        }

        drop(guard);
        slot.waiters.fetch_sub(1, Ordering::SeqCst);

        !timed_out
    }

    fn wake_one(&self, key: usize) -> WakeResult {
        self.wake_all(key)
    }

    fn wake_all(&self, key: usize) -> WakeResult {
        let slot = slot_for(key);

        if slot.waiters.load(Ordering::SeqCst) == 0 {
            return WakeResult::NoWaiters;
        }

        let _guard = slot.mutex.lock();
        WakeResult::from_count(slot.condvar.notify_all())
    }

    fn name(&self) -> &'static str {
        "condvar"
    }
}
