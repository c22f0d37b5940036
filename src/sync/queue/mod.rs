/*!
 * Bounded Queues
 *
 * Fixed-capacity FIFO queues with non-blocking `try_enqueue`/`try_dequeue`:
 * - `BoundedQueue`: mutex-guarded ring, linearizable, any thread count
 * - `SpscQueue`: lock-free, exactly one producer and one consumer
 * - `MpmcQueue`: lock-free, any number of producers and consumers
 *
 * A full queue hands the value back in `Full<T>`; an empty one returns
 * `None`. Values move into the queue on enqueue and out on dequeue; values
 * still queued when the queue is dropped are dropped with it.
 *
 * Every ring obtains its slots from an `Allocator` (`Global` unless one is
 * passed to `with_allocator`), and allocation failure is a constructor
 * error.
 */

mod bounded;
mod mpmc;
mod spsc;

pub use bounded::BoundedQueue;
pub use mpmc::MpmcQueue;
pub use spsc::{Consumer, Producer, SpscQueue};

use crate::errors::{SyncError, SyncResult};
use std::ops::Deref;

/// Pads and aligns a value to its own cache line
#[derive(Debug, Default)]
#[repr(align(64))]
pub(crate) struct CacheAligned<T>(pub(crate) T);

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

/// Validate a requested capacity
///
/// Indices are kept in `AtomicCounter`s, so capacities must fit in `isize`.
pub(crate) fn check_capacity(capacity: usize) -> SyncResult<isize> {
    if capacity == 0 {
        return Err(SyncError::ZeroCapacity);
    }
    isize::try_from(capacity).map_err(|_| SyncError::CapacityOverflow { capacity })
}
