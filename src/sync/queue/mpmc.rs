/*!
 * Lock-Free MPMC Queue
 *
 * Bounded ring shared by any number of producers and consumers.
 *
 * # Stamps
 *
 * `head` and `tail` count positions monotonically and are never reduced
 * modulo the capacity; position `p` lives in slot `p mod C`. Each slot
 * carries a stamp saying which position it is ready for:
 *
 * - `2p`: empty, waiting for the enqueue at position `p`
 * - `2p + 1`: holds the item enqueued at position `p`
 *
 * A producer that loaded `tail = p` claims the position by CAS on `tail`
 * only after seeing stamp `2p`, writes the value, then publishes `2p + 1`.
 * A consumer at `head = p` waits for `2p + 1`, claims by CAS on `head`,
 * reads, then publishes `2(p + C)`, handing the slot to the producer one
 * lap later. Doubling keeps "empty for p" and "full for p" distinct for
 * every capacity, including 1.
 *
 * Positions and stamps only grow, so a stamp can never return to a value a
 * thread observed earlier, and a CAS on a position succeeds at most once.
 * The index space is exhausted after about 2^62 operations per queue.
 *
 * A claimant that stalls between its CAS and its stamp store makes that
 * one slot look full to producers or empty to consumers; other threads
 * report `Full`/`None` instead of waiting on it.
 */

use super::{check_capacity, CacheAligned};
use crate::errors::{Full, SyncError, SyncResult};
use crate::memory::buffer::SlotBuffer;
use crate::memory::{Allocator, Global};
use crate::sync::atomic::AtomicCounter;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::Arc;

struct Slot<T> {
    stamp: AtomicCounter,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// Multi-producer multi-consumer ring buffer
///
/// # Examples
///
/// ```
/// use rtl_sync::MpmcQueue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(MpmcQueue::new(64).unwrap());
/// let producers: Vec<_> = (0..4)
///     .map(|p| {
///         let queue = queue.clone();
///         thread::spawn(move || {
///             for i in 0..10 {
///                 let mut item = p * 10 + i;
///                 while let Err(full) = queue.try_enqueue(item) {
///                     item = full.into_inner();
///                     thread::yield_now();
///                 }
///             }
///         })
///     })
///     .collect();
/// for handle in producers {
///     handle.join().unwrap();
/// }
///
/// let mut seen: Vec<_> = std::iter::from_fn(|| queue.try_dequeue()).collect();
/// seen.sort_unstable();
/// assert_eq!(seen, (0..40).collect::<Vec<_>>());
/// ```
pub struct MpmcQueue<T> {
    slots: SlotBuffer<Slot<T>>,
    head: CacheAligned<AtomicCounter>,
    tail: CacheAligned<AtomicCounter>,
    capacity: usize,
}

// SAFETY: a slot's value is accessed only by the thread whose CAS claimed
// its position, between the claim and the stamp store
unsafe impl<T: Send> Send for MpmcQueue<T> {}
unsafe impl<T: Send> Sync for MpmcQueue<T> {}

impl<T> MpmcQueue<T> {
    pub fn new(capacity: usize) -> SyncResult<Self> {
        Self::with_allocator(capacity, Global::shared())
    }

    pub fn with_allocator(capacity: usize, allocator: Arc<dyn Allocator>) -> SyncResult<Self> {
        let lap = check_capacity(capacity)?;
        // Stamps reach 2 * capacity on the first lap
        lap.checked_mul(2)
            .ok_or(SyncError::CapacityOverflow { capacity })?;

        let slots = SlotBuffer::new(capacity, allocator, |i| Slot {
            stamp: AtomicCounter::new(2 * i as isize),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        })?;

        Ok(Self {
            slots,
            head: CacheAligned(AtomicCounter::new(0)),
            tail: CacheAligned(AtomicCounter::new(0)),
            capacity,
        })
    }

    #[inline]
    fn slot(&self, position: isize) -> &Slot<T> {
        &self.slots[position as usize % self.capacity]
    }

    /// Append `value` unless the queue is full
    pub fn try_enqueue(&self, value: T) -> Result<(), Full<T>> {
        let mut pos = self.tail.load();

        loop {
            let slot = self.slot(pos);
            let diff = slot.stamp.load().wrapping_sub(pos.wrapping_mul(2));

            if diff == 0 {
                let observed = self.tail.compare_exchange(pos, pos.wrapping_add(1));
                if observed == pos {
                    // SAFETY: the CAS made this thread the only claimant of
                    // position `pos`; the slot is empty (stamp 2 * pos)
                    unsafe { (*slot.value.get()).write(value) };
                    slot.stamp.store(pos.wrapping_mul(2).wrapping_add(1));
                    return Ok(());
                }
                pos = observed;
            } else if diff < 0 {
                // Slot still holds the item from one lap back
                return Err(Full(value));
            } else {
                pos = self.tail.load();
            }
        }
    }

    /// Remove the oldest available item, or `None` if the queue is empty
    pub fn try_dequeue(&self) -> Option<T> {
        let mut pos = self.head.load();

        loop {
            let slot = self.slot(pos);
            let diff = slot
                .stamp
                .load()
                .wrapping_sub(pos.wrapping_mul(2).wrapping_add(1));

            if diff == 0 {
                let observed = self.head.compare_exchange(pos, pos.wrapping_add(1));
                if observed == pos {
                    // SAFETY: the CAS made this thread the only claimant of
                    // position `pos`; the stamp says the value is published
                    let value = unsafe { (*slot.value.get()).assume_init_read() };
                    let next_lap = pos.wrapping_add(self.capacity as isize);
                    slot.stamp.store(next_lap.wrapping_mul(2));
                    return Some(value);
                }
                pos = observed;
            } else if diff < 0 {
                return None;
            } else {
                pos = self.head.load();
            }
        }
    }

    /// Number of queued items (snapshot, clamped to `0..=capacity`)
    pub fn len(&self) -> usize {
        let head = self.head.load();
        let tail = self.tail.load();
        tail.wrapping_sub(head).clamp(0, self.capacity as isize) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Drop for MpmcQueue<T> {
    fn drop(&mut self) {
        for slot in self.slots.iter() {
            // Odd stamp: published and never consumed
            if slot.stamp.load() & 1 == 1 {
                // SAFETY: no operation is in flight during drop
                unsafe { (*slot.value.get()).assume_init_drop() };
            }
        }
    }
}

impl<T> fmt::Debug for MpmcQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpmcQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
