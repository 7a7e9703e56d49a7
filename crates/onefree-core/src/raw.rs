//! Untracked block references.
//!
//! A [`RawHandle`] is a bare, copyable [`BlockId`] with no notion of whether it
//! has been released. Every copy can free the block, and nothing records that
//! one already did. Against the slab a second release is reported as
//! [`SlabError::DoubleFree`]; if the block has been handed out again in the
//! meantime, the stale release frees the new owner's block instead.

use tracing::trace;

use crate::{AllocationError, BlockId, Slab, SlabError};

/// Unowned, copyable reference to a slab block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawHandle(BlockId);

impl RawHandle {
    /// Allocate `size` bytes from `slab`.
    pub fn acquire(slab: &Slab, size: usize) -> Result<Self, AllocationError> {
        slab.allocate(size).map(Self).ok_or(AllocationError { size })
    }

    /// Block this handle points at.
    pub fn block(self) -> BlockId {
        self.0
    }

    /// Free the block. Nothing stops another copy from doing the same.
    pub fn release(self, slab: &Slab) -> Result<(), SlabError> {
        trace!(block = self.0.index(), "raw release");
        slab.try_deallocate(self.0)
    }
}
