/*!
 * Slot Buffer
 * Fixed-length array of slots allocated through an `Allocator`
 */

use super::traits::Allocator;
use crate::errors::{SyncError, SyncResult};
use std::alloc::Layout;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, warn};

/// Owned, fixed-length slot array
///
/// The length never changes after construction, so slot addresses are
/// stable for the lifetime of the buffer. Slots are dropped and the block
/// released on drop.
pub(crate) struct SlotBuffer<S> {
    ptr: NonNull<S>,
    len: usize,
    layout: Layout,
    allocator: Arc<dyn Allocator>,
}

// SAFETY: the buffer owns its slots like a Box<[S]>
unsafe impl<S: Send> Send for SlotBuffer<S> {}
unsafe impl<S: Sync> Sync for SlotBuffer<S> {}

impl<S> SlotBuffer<S> {
    /// Allocate `len` slots and initialize slot `i` with `init(i)`
    pub(crate) fn new(
        len: usize,
        allocator: Arc<dyn Allocator>,
        mut init: impl FnMut(usize) -> S,
    ) -> SyncResult<Self> {
        let layout =
            Layout::array::<S>(len).map_err(|_| SyncError::CapacityOverflow { capacity: len })?;

        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            match allocator.allocate(layout) {
                Ok(ptr) => ptr.cast::<S>(),
                Err(err) => {
                    warn!(
                        bytes = layout.size(),
                        allocator = allocator.name(),
                        "Slot buffer allocation failed"
                    );
                    return Err(err.into());
                }
            }
        };

        for i in 0..len {
            // SAFETY: i < len and the block holds len slots
            unsafe { ptr.as_ptr().add(i).write(init(i)) };
        }

        debug!(
            slots = len,
            bytes = layout.size(),
            allocator = allocator.name(),
            "Slot buffer allocated"
        );

        Ok(Self {
            ptr,
            len,
            layout,
            allocator,
        })
    }
}

impl<S> Deref for SlotBuffer<S> {
    type Target = [S];

    #[inline(always)]
    fn deref(&self) -> &[S] {
        // SAFETY: all len slots were initialized in new()
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<S> Drop for SlotBuffer<S> {
    fn drop(&mut self) {
        // SAFETY: slots are initialized and dropped exactly once here
        unsafe {
            std::ptr::drop_in_place(std::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            ));
            if self.layout.size() != 0 {
                self.allocator.release(self.ptr.cast(), self.layout);
            }
        }
    }
}
