/*!
 * Global Allocator
 * Forwards to the process allocator
 */

use super::traits::Allocator;
use super::types::{AllocError, AllocResult};
use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::{Arc, OnceLock};

/// The process-wide allocator (`std::alloc`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Global;

impl Global {
    /// Shared handle used by constructors that take no allocator
    pub fn shared() -> Arc<dyn Allocator> {
        static SHARED: OnceLock<Arc<dyn Allocator>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(Global)).clone()
    }
}

impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        // SAFETY: layout has a non-zero size
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::for_layout(layout))
    }

    #[inline]
    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }

    fn name(&self) -> &'static str {
        "global"
    }
}
