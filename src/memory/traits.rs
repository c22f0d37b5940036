/*!
 * Memory Traits
 * Allocation interface consumed by every primitive that owns a buffer
 */

use super::types::AllocResult;
use std::alloc::Layout;
use std::ptr::NonNull;

/// Backing-storage allocator
///
/// Every queue obtains its slot buffer through this interface at
/// construction and hands it back on drop. A refused allocation surfaces
/// as a construction error, never as a panic.
///
/// Callers never pass a zero-sized layout.
pub trait Allocator: Send + Sync {
    /// Allocate a block satisfying `layout`
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>>;

    /// Release a block previously returned by `allocate`
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same
    /// `layout`, and must not be released twice.
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout);

    /// Allocator name for diagnostics
    fn name(&self) -> &'static str {
        "custom"
    }
}
