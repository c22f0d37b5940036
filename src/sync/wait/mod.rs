/*!
 * Wait/Notify Primitives
 *
 * Event-driven blocking with multiple strategies:
 * - Futex-based (parking_lot_core, fastest)
 * - Condvar-based (cross-platform, reliable)
 * - Spinwait-based (low-latency, high-CPU)
 * - Polling (fixed sleep between checks)
 */

mod condvar;
mod config;
mod futex;
mod poll;
mod spinwait;
mod traits;
#[allow(clippy::module_inception)]
mod wait;

// Re-export public API
pub use config::{ParseStrategyError, StrategyType, SyncConfig};
pub use traits::{WaitStrategy, WakeResult};
pub use wait::{WaitError, WaitQueue, WaitResult};

// Re-export specific strategies for advanced users
pub use condvar::CondvarWait;
pub use futex::FutexWait;
pub use poll::PollWait;
pub use spinwait::SpinWait;
