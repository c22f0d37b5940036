/*!
 * Synchronization Primitives
 *
 * - `AtomicCounter`: sequentially consistent machine word
 * - `locks`: mutex, reader-writer lock, barrier
 * - `queue`: bounded, SPSC and MPMC ring buffers
 * - `wait`: wait/notify with pluggable strategies (futex, condvar,
 *   adaptive spin, polling)
 *
 * Blocking primitives sleep on a `WaitQueue` whose strategy comes from a
 * `SyncConfig`; try-operations on the queues never block.
 */

pub mod atomic;
pub mod locks;
pub mod queue;
pub mod wait;

pub use atomic::AtomicCounter;
pub use locks::{
    Barrier, BarrierWaitResult, DefaultRawMutex, Mutex, MutexGuard, RwLock, RwLockReadGuard,
    RwLockState, RwLockWriteGuard, SpinRawMutex,
};
pub use queue::{BoundedQueue, Consumer, MpmcQueue, Producer, SpscQueue};
pub use wait::{
    CondvarWait, FutexWait, ParseStrategyError, PollWait, SpinWait, StrategyType, SyncConfig,
    WaitError, WaitQueue, WaitResult, WaitStrategy, WakeResult,
};
