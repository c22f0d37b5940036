/*!
 * Limits and Constants
 *
 * Tuning values for the wait strategies and lock backends, grouped by
 * the component that uses them.
 */

use std::time::Duration;

// =============================================================================
// WAIT STRATEGIES
// =============================================================================

/// Number of condvar parking slots shared by all condvar waits
/// Power of 2 so the slot index is a mask of the key hash
pub const CONDVAR_PARKING_SLOTS: usize = 512;

/// Sleep between polls for the polling strategy (1ms)
/// Matches the fixed short sleep of classic spin-and-sleep locks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Spin budget before an adaptive waiter parks
pub const DEFAULT_SPIN_DURATION: Duration = Duration::from_micros(10);

/// Spin iteration cap before an adaptive waiter parks
pub const DEFAULT_MAX_SPINS: u32 = 100;

/// Iterations of pure `spin_loop()` before yielding
pub const SPIN_PHASE_ITERATIONS: u32 = 10;

/// Iterations of `yield_now()` before sleeping with backoff
pub const YIELD_PHASE_ITERATIONS: u32 = 50;

/// Cap for the exponential sleep backoff of the spin strategy
pub const MAX_SPIN_BACKOFF: Duration = Duration::from_millis(1);

// =============================================================================
// LOCK BACKENDS
// =============================================================================

/// Failed test-and-set rounds before a spinlock starts yielding the CPU
pub const SPIN_LOCK_YIELD_THRESHOLD: u32 = 64;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Environment variable selecting the wait strategy (futex|condvar|spin|poll|auto)
pub const WAIT_STRATEGY_ENV: &str = "RTL_SYNC_WAIT_STRATEGY";

/// Environment variable enabling JSON trace output
pub const TRACE_JSON_ENV: &str = "RTL_SYNC_TRACE_JSON";
