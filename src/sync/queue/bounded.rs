/*!
 * Mutex-Guarded Bounded Queue
 *
 * Circular buffer whose cursors live inside a `Mutex`. Every enqueue and
 * dequeue runs entirely under the lock, which makes the queue
 * linearizable. The element count is mirrored in an `AtomicCounter` so
 * `len`/`is_empty`/`is_full` can answer without taking the lock.
 */

use super::check_capacity;
use crate::errors::{Full, SyncResult};
use crate::memory::buffer::SlotBuffer;
use crate::memory::{Allocator, Global};
use crate::sync::atomic::AtomicCounter;
use crate::sync::locks::Mutex;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::Arc;

/// Ring positions, only touched under the mutex
#[derive(Debug, Default)]
struct Cursor {
    head: usize,
    tail: usize,
}

/// Fixed-capacity FIFO queue protected by a mutex
///
/// # Examples
///
/// ```
/// use rtl_sync::BoundedQueue;
///
/// let queue = BoundedQueue::new(2).unwrap();
/// queue.try_enqueue("a").unwrap();
/// queue.try_enqueue("b").unwrap();
///
/// // Full: the value comes back to the caller
/// let rejected = queue.try_enqueue("c").unwrap_err();
/// assert_eq!(rejected.into_inner(), "c");
///
/// assert_eq!(queue.try_dequeue(), Some("a"));
/// assert_eq!(queue.try_dequeue(), Some("b"));
/// assert_eq!(queue.try_dequeue(), None);
/// ```
pub struct BoundedQueue<T> {
    slots: SlotBuffer<UnsafeCell<MaybeUninit<T>>>,
    cursor: Mutex<Cursor>,
    size: AtomicCounter,
    capacity: usize,
}

// SAFETY: slots are only read or written while holding `cursor`
unsafe impl<T: Send> Send for BoundedQueue<T> {}
unsafe impl<T: Send> Sync for BoundedQueue<T> {}

impl<T> BoundedQueue<T> {
    /// Create a queue holding up to `capacity` items
    pub fn new(capacity: usize) -> SyncResult<Self> {
        Self::with_allocator(capacity, Global::shared())
    }

    /// Create a queue whose slots come from `allocator`
    pub fn with_allocator(capacity: usize, allocator: Arc<dyn Allocator>) -> SyncResult<Self> {
        check_capacity(capacity)?;
        let slots = SlotBuffer::new(capacity, allocator, |_| {
            UnsafeCell::new(MaybeUninit::uninit())
        })?;

        Ok(Self {
            slots,
            cursor: Mutex::new(Cursor::default()),
            size: AtomicCounter::new(0),
            capacity,
        })
    }

    /// Append `value` unless the queue is full
    pub fn try_enqueue(&self, value: T) -> Result<(), Full<T>> {
        let mut cursor = self.cursor.lock();
        if self.size.load() as usize == self.capacity {
            return Err(Full(value));
        }

        // SAFETY: slot `tail` is vacant (size < capacity) and we hold the lock
        unsafe { (*self.slots[cursor.tail].get()).write(value) };
        cursor.tail = (cursor.tail + 1) % self.capacity;
        self.size.fetch_add(1);
        Ok(())
    }

    /// Remove the oldest item, or `None` if the queue is empty
    pub fn try_dequeue(&self) -> Option<T> {
        let mut cursor = self.cursor.lock();
        if self.size.load() == 0 {
            return None;
        }

        // SAFETY: slot `head` is occupied (size > 0) and we hold the lock
        let value = unsafe { (*self.slots[cursor.head].get()).assume_init_read() };
        cursor.head = (cursor.head + 1) % self.capacity;
        self.size.fetch_sub(1);
        Some(value)
    }

    /// Number of queued items (snapshot)
    #[inline]
    pub fn len(&self) -> usize {
        self.size.load() as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Drop for BoundedQueue<T> {
    fn drop(&mut self) {
        let len = self.size.load() as usize;
        let head = self.cursor.get_mut().head;

        for offset in 0..len {
            let index = (head + offset) % self.capacity;
            // SAFETY: the `len` slots starting at head are occupied
            unsafe { (*self.slots[index].get()).assume_init_drop() };
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
