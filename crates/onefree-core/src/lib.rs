#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Single-release ownership of allocated resources.
//!
//! [`ResourceHandle`] owns at most one block from a [`RawAllocator`] and frees
//! it at most once, however many times it is released or moved. [`RawHandle`]
//! is the untracked counterpart that can free the same block twice.

mod error;
mod handle;
#[allow(unsafe_code)]
mod heap;
mod raw;
mod slab;

pub use error::AllocationError;
pub use handle::{HandleState, ResourceHandle};
pub use heap::{Heap, HeapBlock};
pub use onefree_api::RawAllocator;
pub use raw::RawHandle;
pub use slab::{BLOCK_SIZE, BlockId, MAX_PAYLOAD, Slab, SlabError};

/// Allocate `size` bytes from `allocator` into a new owning handle.
pub fn acquire<A: RawAllocator + ?Sized>(
    allocator: &A,
    size: usize,
) -> Result<ResourceHandle<'_, A>, AllocationError> {
    ResourceHandle::acquire(allocator, size)
}

/// Move ownership out of `handle` into a new handle.
pub fn transfer<A: RawAllocator + ?Sized>(
    handle: ResourceHandle<'_, A>,
) -> ResourceHandle<'_, A> {
    handle.transfer()
}

/// Free whatever `handle` owns. Releasing an empty handle does nothing.
///
/// The handle is consumed, so the same binding cannot be released twice:
///
/// ```compile_fail
/// use onefree_core::{acquire, release, Slab};
///
/// let slab = Slab::new(1024);
/// let handle = acquire(&slab, 4).unwrap();
/// release(handle);
/// release(handle);
/// ```
///
/// Moving ownership out of a slot that stays alive leaves it empty, and
/// releasing it again is harmless:
///
/// ```
/// use onefree_core::{acquire, release, Slab};
///
/// let slab = Slab::new(1024);
/// let mut handle = acquire(&slab, 4).unwrap();
/// release(handle.take());
/// release(handle.take());
/// assert_eq!(slab.free_blocks(), slab.total_blocks());
/// ```
pub fn release<A: RawAllocator + ?Sized>(handle: ResourceHandle<'_, A>) {
    handle.release()
}
