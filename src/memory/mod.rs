/*!
 * Memory Module
 * Allocation interface for primitive backing storage
 */

pub(crate) mod buffer;
pub mod global;
pub mod tracking;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use global::Global;
pub use tracking::TrackingAllocator;
pub use traits::*;
pub use types::*;
