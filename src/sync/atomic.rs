/*!
 * Atomic Counter
 * Machine-word integer with sequentially consistent operations
 *
 * Every operation is `SeqCst`, so it acts as both acquire and release and
 * participates in the single total order of all `SeqCst` operations. The
 * higher-level primitives rely on that order to compose several counters
 * without extra fences.
 */

use std::fmt;
use std::sync::atomic::{AtomicIsize, Ordering};

const ORDER: Ordering = Ordering::SeqCst;

/// Signed machine-word counter; every operation is a full barrier
///
/// Arithmetic wraps on overflow.
///
/// # Examples
///
/// ```
/// use rtl_sync::AtomicCounter;
///
/// let value = AtomicCounter::new(42);
/// assert_eq!(value.fetch_add(10), 42);
/// assert_eq!(value.fetch_sub(5), 52);
/// assert!(value.compare_exchange_bool(47, 100));
/// assert!(!value.compare_exchange_bool(47, 200));
/// assert_eq!(value.load(), 100);
/// ```
#[repr(transparent)]
pub struct AtomicCounter {
    value: AtomicIsize,
}

impl AtomicCounter {
    #[inline]
    pub const fn new(value: isize) -> Self {
        Self {
            value: AtomicIsize::new(value),
        }
    }

    #[inline(always)]
    pub fn load(&self) -> isize {
        self.value.load(ORDER)
    }

    #[inline(always)]
    pub fn store(&self, value: isize) {
        self.value.store(value, ORDER)
    }

    /// Add and return the previous value
    #[inline(always)]
    pub fn fetch_add(&self, delta: isize) -> isize {
        self.value.fetch_add(delta, ORDER)
    }

    /// Subtract and return the previous value
    #[inline(always)]
    pub fn fetch_sub(&self, delta: isize) -> isize {
        self.value.fetch_sub(delta, ORDER)
    }

    /// Store `desired` if the current value is `expected`
    ///
    /// Returns the value observed before the operation; the exchange
    /// happened iff it equals `expected`.
    #[inline(always)]
    pub fn compare_exchange(&self, expected: isize, desired: isize) -> isize {
        match self.value.compare_exchange(expected, desired, ORDER, ORDER) {
            Ok(old) | Err(old) => old,
        }
    }

    /// Store `desired` if the current value is `expected`; report success
    #[inline(always)]
    pub fn compare_exchange_bool(&self, expected: isize, desired: isize) -> bool {
        self.value
            .compare_exchange(expected, desired, ORDER, ORDER)
            .is_ok()
    }

    /// Consume the counter and return its value
    #[inline]
    pub fn into_inner(self) -> isize {
        self.value.into_inner()
    }

    /// Address used as a parking key by the wait strategies
    #[inline(always)]
    pub(crate) fn addr(&self) -> usize {
        &self.value as *const AtomicIsize as usize
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<isize> for AtomicCounter {
    fn from(value: isize) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for AtomicCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AtomicCounter").field(&self.load()).finish()
    }
}
