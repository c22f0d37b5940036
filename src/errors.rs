/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use crate::memory::AllocError;
use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Result type for primitive construction
pub type SyncResult<T> = Result<T, SyncError>;

/// Construction errors for the synchronization primitives
///
/// Only construction can fail. Full, empty and contended states are
/// reported through `Full`, `Option` and blocking, never through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SyncError {
    #[error("Queue capacity must be greater than zero")]
    #[diagnostic(
        code(sync::zero_capacity),
        help("Pass a capacity of at least 1 when creating the queue.")
    )]
    ZeroCapacity,

    #[error("Queue capacity {capacity} overflows the addressable slot buffer")]
    #[diagnostic(
        code(sync::capacity_overflow),
        help("Reduce the capacity so the slot buffer fits in isize::MAX bytes.")
    )]
    CapacityOverflow { capacity: usize },

    #[error("Failed to allocate {bytes} bytes (align {align}) for backing storage")]
    #[diagnostic(
        code(sync::allocation_failed),
        help("The allocator refused the request. Check memory limits or free resources.")
    )]
    AllocationFailed { bytes: usize, align: usize },

    #[error("Barrier must expect at least one participant")]
    #[diagnostic(
        code(sync::zero_participants),
        help("Create the barrier with the number of threads that will call wait().")
    )]
    ZeroParticipants,

    #[error("Barrier cannot track {participants} participants")]
    #[diagnostic(
        code(sync::too_many_participants),
        help("The participant count must fit in isize::MAX.")
    )]
    TooManyParticipants { participants: usize },
}

impl From<AllocError> for SyncError {
    fn from(err: AllocError) -> Self {
        SyncError::AllocationFailed {
            bytes: err.size,
            align: err.align,
        }
    }
}

/// A rejected enqueue; hands the value back to the caller
///
/// Full is an expected condition, so the value is never dropped.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Recover the value that did not fit
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("queue is full")
    }
}

impl<T> std::error::Error for Full<T> {}
