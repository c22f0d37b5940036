/*!
 * rtl-sync
 * Thread synchronization primitives with pluggable wait strategies
 *
 * Blocking: `Mutex`, `RwLock` (writer preference), `Barrier`.
 * Non-blocking queues: `BoundedQueue`, `SpscQueue`, `MpmcQueue`.
 * Queue storage comes from an `Allocator`; `TrackingAllocator` adds leak
 * reports and failure injection.
 */

pub mod errors;
pub mod limits;
pub mod memory;
pub mod monitoring;
pub mod sync;

// Re-exports
pub use errors::{Full, SyncError, SyncResult};
pub use memory::{AllocError, Allocator, Global, TrackingAllocator};
pub use monitoring::init_tracing;
pub use sync::{
    AtomicCounter, Barrier, BarrierWaitResult, BoundedQueue, Mutex, MutexGuard, MpmcQueue,
    RwLock, RwLockState, SpinRawMutex, SpscQueue, StrategyType, SyncConfig, WaitQueue,
};
