/*!
 * Memory Types
 * Common types for backing-storage allocation
 */

use serde::Serialize;
use std::alloc::Layout;
use thiserror::Error;

/// Allocation result
pub type AllocResult<T> = Result<T, AllocError>;

/// Allocation failure reported by an `Allocator`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Allocation of {size} bytes (align {align}) failed")]
pub struct AllocError {
    pub size: usize,
    pub align: usize,
}

impl AllocError {
    #[inline]
    pub fn for_layout(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// Allocation statistics for a tracking allocator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocStats {
    pub live_allocations: usize,
    pub live_bytes: usize,
    pub peak_bytes: usize,
    pub total_allocations: u64,
    pub failed_allocations: u64,
}

/// A live allocation that was never released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeakRecord {
    pub address: usize,
    pub size: usize,
    pub align: usize,
}
