/*!
 * Mutex
 *
 * Mutual exclusion over a pluggable raw backend. Locking blocks until the
 * lock is acquired and returns an RAII guard; dropping the guard unlocks.
 *
 * # Policy
 *
 * - Non-reentrant: locking again from the thread that holds the lock
 *   deadlocks. Code that needs the protected value in nested calls should
 *   pass the guard down instead.
 * - No try-lock and no timeout.
 * - A mutex cannot be dropped while locked, because every guard borrows it.
 */

use parking_lot::lock_api::RawMutex;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

/// Default backend: parking_lot's futex-style word lock
pub type DefaultRawMutex = parking_lot::RawMutex;

/// Mutex protecting a value of type `T`
///
/// `Mutex<()>` is a bare lock.
///
/// # Examples
///
/// ```
/// use rtl_sync::Mutex;
/// use std::sync::Arc;
/// use std::thread;
///
/// let total = Arc::new(Mutex::new(0u64));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let total = total.clone();
///         thread::spawn(move || {
///             for _ in 0..1000 {
///                 *total.lock() += 1;
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(*total.lock(), 4000);
/// ```
pub struct Mutex<T: ?Sized, R = DefaultRawMutex> {
    raw: R,
    data: UnsafeCell<T>,
}

// SAFETY: the raw lock serializes all access to `data`
unsafe impl<T: ?Sized + Send, R: RawMutex + Send> Send for Mutex<T, R> {}
unsafe impl<T: ?Sized + Send, R: RawMutex + Sync> Sync for Mutex<T, R> {}

impl<T> Mutex<T> {
    /// Create an unlocked mutex on the default backend
    #[inline]
    pub const fn new(value: T) -> Self {
        Self::with_raw(<DefaultRawMutex as RawMutex>::INIT, value)
    }
}

impl<T, R: RawMutex> Mutex<T, R> {
    /// Create an unlocked mutex on an explicit backend
    ///
    /// ```
    /// use rtl_sync::{Mutex, SpinRawMutex};
    ///
    /// let mutex = Mutex::with_raw(SpinRawMutex::new(), 1);
    /// *mutex.lock() += 1;
    /// assert_eq!(mutex.into_inner(), 2);
    /// ```
    #[inline]
    pub const fn with_raw(raw: R, value: T) -> Self {
        Self {
            raw,
            data: UnsafeCell::new(value),
        }
    }

    /// Consume the mutex and return the protected value
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized, R: RawMutex> Mutex<T, R> {
    /// Block until the lock is acquired
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, T, R> {
        self.raw.lock();
        MutexGuard {
            mutex: self,
            marker: PhantomData,
        }
    }

    /// Whether some thread currently holds the lock
    ///
    /// Snapshot only; it can change before the caller acts on it.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Mutable access without locking; the borrow proves exclusivity
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T: Default, R: RawMutex> Default for Mutex<T, R> {
    fn default() -> Self {
        Self::with_raw(R::INIT, T::default())
    }
}

impl<T: ?Sized, R: RawMutex> fmt::Debug for Mutex<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

/// Proof of holding a `Mutex`; unlocks on drop
///
/// The backend's guard marker decides whether the guard may move to
/// another thread. The default backend pins it to the locking thread.
#[must_use = "if unused the Mutex will immediately unlock"]
pub struct MutexGuard<'a, T: ?Sized, R: RawMutex = DefaultRawMutex> {
    mutex: &'a Mutex<T, R>,
    marker: PhantomData<(&'a mut T, R::GuardMarker)>,
}

impl<'a, T: ?Sized, R: RawMutex> MutexGuard<'a, T, R> {
    /// Unlock explicitly; same as dropping the guard
    #[inline]
    pub fn unlock(guard: Self) {
        drop(guard);
    }
}

impl<T: ?Sized, R: RawMutex> Deref for MutexGuard<'_, T, R> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T: ?Sized, R: RawMutex> DerefMut for MutexGuard<'_, T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T: ?Sized, R: RawMutex> Drop for MutexGuard<'_, T, R> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: this guard acquired the lock and releases it exactly once
        unsafe { self.mutex.raw.unlock() };
    }
}

impl<T: ?Sized + fmt::Debug, R: RawMutex> fmt::Debug for MutexGuard<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
