/*!
 * Lock-Free SPSC Queue
 *
 * Ring buffer for exactly one producer and one consumer. `split` hands out
 * one `Producer` and one `Consumer` borrowed from the queue; neither half
 * is `Clone`, and their operations take `&mut self`, so a second producer
 * or consumer cannot exist at the same time.
 *
 * # Indices
 *
 * The ring has `capacity + 1` slots. `head == tail` means empty and
 * `(tail + 1) mod N == head` means full, so exactly `capacity` items fit.
 * Only the producer stores `tail` and only the consumer stores `head`.
 * The producer writes the slot before publishing the new `tail`; the
 * consumer reads the slot before publishing the new `head`.
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

/// Single-producer single-consumer ring buffer
///
/// # Examples
///
/// ```
/// use rtl_sync::SpscQueue;
/// use std::thread;
///
/// let mut queue = SpscQueue::new(16).unwrap();
/// let (mut producer, mut consumer) = queue.split();
///
/// thread::scope(|s| {
///     s.spawn(move || {
///         for i in 0..100 {
///             let mut item = i;
///             while let Err(full) = producer.try_enqueue(item) {
///                 item = full.into_inner();
///                 thread::yield_now();
///             }
///         }
///     });
///
///     let mut expected = 0;
///     while expected < 100 {
///         if let Some(item) = consumer.try_dequeue() {
///             assert_eq!(item, expected);
///             expected += 1;
///         }
///     }
/// });
/// ```
pub struct SpscQueue<T> {
    slots: SlotBuffer<UnsafeCell<MaybeUninit<T>>>,
    head: CacheAligned<AtomicCounter>,
    tail: CacheAligned<AtomicCounter>,
    capacity: usize,
}

// SAFETY: a slot is touched by the producer only while outside
// [head, tail) and by the consumer only while inside it
unsafe impl<T: Send> Send for SpscQueue<T> {}
unsafe impl<T: Send> Sync for SpscQueue<T> {}

impl<T> SpscQueue<T> {
    pub fn new(capacity: usize) -> SyncResult<Self> {
        Self::with_allocator(capacity, Global::shared())
    }

    pub fn with_allocator(capacity: usize, allocator: Arc<dyn Allocator>) -> SyncResult<Self> {
        check_capacity(capacity)?;
        // One slot stays empty to tell full from empty
        let ring = capacity
            .checked_add(1)
            .ok_or(SyncError::CapacityOverflow { capacity })?;
        let slots = SlotBuffer::new(ring, allocator, |_| UnsafeCell::new(MaybeUninit::uninit()))?;

        Ok(Self {
            slots,
            head: CacheAligned(AtomicCounter::new(0)),
            tail: CacheAligned(AtomicCounter::new(0)),
            capacity,
        })
    }

    /// Borrow the producer and consumer halves
    pub fn split(&mut self) -> (Producer<'_, T>, Consumer<'_, T>) {
        let queue: &Self = self;
        (Producer { queue }, Consumer { queue })
    }

    /// Enqueue through an exclusive borrow (no split needed)
    pub fn try_enqueue(&mut self, value: T) -> Result<(), Full<T>> {
        self.push(value)
    }

    /// Dequeue through an exclusive borrow (no split needed)
    pub fn try_dequeue(&mut self) -> Option<T> {
        self.pop()
    }

    #[inline]
    fn next(&self, index: usize) -> usize {
        (index + 1) % self.slots.len()
    }

    /// Producer side. Caller must be the only producer.
    fn push(&self, value: T) -> Result<(), Full<T>> {
        let tail = self.tail.load() as usize;
        let next = self.next(tail);
        if next == self.head.load() as usize {
            return Err(Full(value));
        }

        // SAFETY: `tail` is outside [head, tail), so the consumer is not
        // reading it, and only the producer writes slots
        unsafe { (*self.slots[tail].get()).write(value) };
        self.tail.store(next as isize);
        Ok(())
    }

    /// Consumer side. Caller must be the only consumer.
    fn pop(&self) -> Option<T> {
        let head = self.head.load() as usize;
        if head == self.tail.load() as usize {
            return None;
        }

        // SAFETY: the producer published this slot before advancing tail
        // past it, and will not reuse it until head moves on
        let value = unsafe { (*self.slots[head].get()).assume_init_read() };
        self.head.store(self.next(head) as isize);
        Some(value)
    }

    /// Number of queued items (snapshot)
    pub fn len(&self) -> usize {
        let ring = self.slots.len();
        let head = self.head.load() as usize;
        let tail = self.tail.load() as usize;
        (tail + ring - head) % ring
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Drop for SpscQueue<T> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

impl<T> fmt::Debug for SpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Writing half of an `SpscQueue`
pub struct Producer<'a, T> {
    queue: &'a SpscQueue<T>,
}

impl<T> Producer<'_, T> {
    /// Append `value` unless the queue is full
    #[inline]
    pub fn try_enqueue(&mut self, value: T) -> Result<(), Full<T>> {
        self.queue.push(value)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() == self.queue.capacity
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity
    }
}

impl<T> fmt::Debug for Producer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer").field("queue", self.queue).finish()
    }
}

/// Reading half of an `SpscQueue`
pub struct Consumer<'a, T> {
    queue: &'a SpscQueue<T>,
}

impl<T> Consumer<'_, T> {
    /// Remove the oldest item, or `None` if the queue is empty
    #[inline]
    pub fn try_dequeue(&mut self) -> Option<T> {
        self.queue.pop()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity
    }
}

impl<T> fmt::Debug for Consumer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer").field("queue", self.queue).finish()
    }
}
