/*!
 * Reader-Writer Lock
 *
 * Many concurrent readers or one writer, with writer preference: once a
 * writer is waiting, new readers block until it has come and gone.
 *
 * # State
 *
 * - `readers`: read guards currently alive
 * - `writers_waiting`: writers registered but not yet admitted
 * - `writer_active`: 0 or 1
 *
 * Admission (readers incrementing, writers activating) happens under the
 * entry mutex, which keeps `writer_active = 1 => readers = 0`. Releases
 * only touch the counters and then notify the wait queue.
 *
 * Read locks are not recursive. A thread that takes a second read lock
 * while a writer waits deadlocks against that writer.
 */

use super::mutex::Mutex;
use crate::sync::atomic::AtomicCounter;
use crate::sync::wait::{SyncConfig, WaitQueue};
use serde::Serialize;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// Snapshot of the lock's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RwLockState {
    pub readers: isize,
    pub writers_waiting: isize,
    pub writer_active: isize,
}

impl RwLockState {
    /// No holders and nobody waiting to write
    pub fn is_idle(&self) -> bool {
        self.readers == 0 && self.writers_waiting == 0 && self.writer_active == 0
    }
}

/// Writer-preferring reader-writer lock
///
/// # Examples
///
/// ```
/// use rtl_sync::RwLock;
///
/// let lock = RwLock::new(vec![1, 2]);
/// {
///     let a = lock.read();
///     let b = lock.read();
///     assert_eq!(a.len() + b.len(), 4);
/// }
/// lock.write().push(3);
/// assert!(lock.state().is_idle());
/// assert_eq!(lock.into_inner(), vec![1, 2, 3]);
/// ```
pub struct RwLock<T: ?Sized> {
    entry: Mutex<()>,
    readers: AtomicCounter,
    writers_waiting: AtomicCounter,
    writer_active: AtomicCounter,
    waiters: WaitQueue,
    data: UnsafeCell<T>,
}

// SAFETY: readers share &T across threads, writers get exclusive &mut T
unsafe impl<T: ?Sized + Send> Send for RwLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for RwLock<T> {}

impl<T> RwLock<T> {
    /// Create with the default wait configuration
    pub fn new(value: T) -> Self {
        Self::with_config(value, SyncConfig::default())
    }

    /// Create with an explicit wait strategy for blocked readers and writers
    pub fn with_config(value: T, config: SyncConfig) -> Self {
        Self {
            entry: Mutex::new(()),
            readers: AtomicCounter::new(0),
            writers_waiting: AtomicCounter::new(0),
            writer_active: AtomicCounter::new(0),
            waiters: WaitQueue::new(config),
            data: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> RwLock<T> {
    #[inline]
    fn writer_present(&self) -> bool {
        self.writer_active.load() > 0 || self.writers_waiting.load() > 0
    }

    #[inline]
    fn write_blocked(&self) -> bool {
        self.readers.load() > 0 || self.writer_active.load() > 0
    }

    /// Acquire shared access, blocking while a writer is active or waiting
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        loop {
            let entry = self.entry.lock();
            if !self.writer_present() {
                self.readers.fetch_add(1);
                drop(entry);
                return RwLockReadGuard { lock: self };
            }
            drop(entry);

            self.waiters.block_while(|| self.writer_present());
        }
    }

    /// Acquire exclusive access, blocking until readers and writers drain
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        let mut entry = self.entry.lock();
        self.writers_waiting.fetch_add(1);

        while self.write_blocked() {
            drop(entry);
            self.waiters.block_while(|| self.write_blocked());
            entry = self.entry.lock();
        }

        self.writers_waiting.fetch_sub(1);
        self.writer_active.store(1);
        drop(entry);

        RwLockWriteGuard { lock: self }
    }

    fn read_unlock(&self) {
        // Only the last reader out can unblock a writer
        if self.readers.fetch_sub(1) == 1 {
            self.waiters.notify_all();
        }
    }

    fn write_unlock(&self) {
        self.writer_active.store(0);
        if self.writers_waiting.load() > 0 {
            trace!("Writer released with writers queued");
        }
        self.waiters.notify_all();
    }

    /// Counter snapshot (diagnostics; fields are read independently)
    pub fn state(&self) -> RwLockState {
        RwLockState {
            readers: self.readers.load(),
            writers_waiting: self.writers_waiting.load(),
            writer_active: self.writer_active.load(),
        }
    }

    /// Name of the wait strategy used for blocking
    pub fn strategy_name(&self) -> &'static str {
        self.waiters.strategy_name()
    }

    /// Mutable access without locking; the borrow proves exclusivity
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T: Default> Default for RwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> fmt::Debug for RwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwLock")
            .field("state", &self.state())
            .field("strategy", &self.strategy_name())
            .finish_non_exhaustive()
    }
}

/// Shared access; releases the read lock on drop
#[must_use = "if unused the RwLock will immediately unlock"]
pub struct RwLockReadGuard<'a, T: ?Sized> {
    lock: &'a RwLock<T>,
}

impl<T: ?Sized> Deref for RwLockReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: readers > 0 excludes any writer
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for RwLockReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.read_unlock();
    }
}

/// Exclusive access; releases the write lock on drop
#[must_use = "if unused the RwLock will immediately unlock"]
pub struct RwLockWriteGuard<'a, T: ?Sized> {
    lock: &'a RwLock<T>,
}

impl<T: ?Sized> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: writer_active = 1 excludes readers and other writers
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for RwLockWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: writer_active = 1 excludes readers and other writers
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for RwLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.write_unlock();
    }
}
