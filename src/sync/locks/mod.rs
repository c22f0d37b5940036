/*!
 * Lock-Based Synchronization Primitives
 *
 * - Mutex over pluggable raw backends (parking_lot word lock, spinlock)
 * - Writer-preferring reader-writer lock
 * - Cyclic barrier
 *
 * The blocking paths of the reader-writer lock and the barrier sleep on a
 * `WaitQueue`, so their wait strategy is configurable per instance.
 */

mod barrier;
mod mutex;
mod rwlock;
mod spin;

// Re-export public API
pub use barrier::{Barrier, BarrierWaitResult};
pub use mutex::{DefaultRawMutex, Mutex, MutexGuard};
pub use rwlock::{RwLock, RwLockReadGuard, RwLockState, RwLockWriteGuard};
pub use spin::SpinRawMutex;
