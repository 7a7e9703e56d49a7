//! Move-only ownership of a single allocation.
//!
//! A [`ResourceHandle`] is either `Owning` a block obtained from some
//! [`RawAllocator`] or `Empty`. Ownership leaves a handle in exactly two ways:
//! it is moved to another handle, or the block is freed. Either way the
//! source ends up `Empty`, and releasing an `Empty` handle does nothing, so
//! the allocator sees at most one `raw_free` per block.

use core::{fmt, mem};

use onefree_api::RawAllocator;
use tracing::{debug, trace, warn};

use crate::{AllocationError, Heap, HeapBlock};

/// Observable ownership state of a [`ResourceHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleState {
    /// Holds no resource.
    Empty,
    /// Holds a resource that will be freed when the handle is released.
    Owning,
}

enum State<'a, A: RawAllocator + ?Sized> {
    Empty,
    Owning { allocator: &'a A, block: A::Block },
}

/// Exclusive owner of at most one block from allocator `A`.
///
/// Dropping an owning handle releases its block.
pub struct ResourceHandle<'a, A: RawAllocator + ?Sized> {
    state: State<'a, A>,
}

impl<'a, A: RawAllocator + ?Sized> ResourceHandle<'a, A> {
    /// Allocate `size` bytes from `allocator` and take ownership of them.
    pub fn acquire(allocator: &'a A, size: usize) -> Result<Self, AllocationError> {
        match allocator.raw_alloc(size) {
            Some(block) => {
                debug!(size, "acquired resource");
                Ok(Self::from_raw(allocator, block))
            }
            None => {
                warn!(size, "allocation failed");
                Err(AllocationError { size })
            }
        }
    }

    /// A handle that owns nothing.
    pub const fn empty() -> Self {
        Self {
            state: State::Empty,
        }
    }

    /// Adopt a block freshly returned by `allocator`.
    ///
    /// Crate-private: slab blocks are `Copy`, so adopting an arbitrary block
    /// could give it a second owner.
    pub(crate) fn from_raw(allocator: &'a A, block: A::Block) -> Self {
        Self {
            state: State::Owning { allocator, block },
        }
    }

    /// Move ownership into a new handle.
    ///
    /// An empty handle transfers to an empty handle.
    pub fn transfer(mut self) -> Self {
        self.take()
    }

    /// Move ownership out of this slot, leaving it empty.
    pub fn take(&mut self) -> Self {
        Self {
            state: mem::replace(&mut self.state, State::Empty),
        }
    }

    /// Free the resource, if any.
    pub fn release(mut self) {
        if !self.free_in_place() {
            trace!("release of empty handle is a no-op");
        }
    }

    /// Free the resource, if any, and leave this slot empty but usable.
    pub fn reset(&mut self) {
        self.free_in_place();
    }

    /// Give up ownership without freeing.
    ///
    /// The block cannot be handed back to a handle afterwards:
    ///
    /// ```compile_fail
    /// use onefree_core::{acquire, ResourceHandle, Slab};
    ///
    /// let slab = Slab::new(1024);
    /// let block = acquire(&slab, 4).unwrap().into_raw().unwrap();
    /// let a = ResourceHandle::from_raw(&slab, block);
    /// ```
    pub fn into_raw(mut self) -> Option<A::Block> {
        match mem::replace(&mut self.state, State::Empty) {
            State::Owning { block, .. } => Some(block),
            State::Empty => None,
        }
    }

    /// Current ownership state.
    pub fn state(&self) -> HandleState {
        match self.state {
            State::Empty => HandleState::Empty,
            State::Owning { .. } => HandleState::Owning,
        }
    }

    /// Whether this handle owns a resource.
    pub fn is_owning(&self) -> bool {
        self.state() == HandleState::Owning
    }

    /// Whether this handle owns nothing.
    pub fn is_empty(&self) -> bool {
        self.state() == HandleState::Empty
    }

    /// Reference to the owned block.
    ///
    /// Only a shared reference is handed out, so the block a handle owns can
    /// never be swapped for another one:
    ///
    /// ```compile_fail
    /// use onefree_core::{acquire, Slab};
    ///
    /// let slab = Slab::new(1024);
    /// let a = acquire(&slab, 4).unwrap();
    /// let b = acquire(&slab, 4).unwrap();
    /// *a.resource().unwrap() = *b.resource().unwrap();
    /// ```
    pub fn resource(&self) -> Option<&A::Block> {
        match &self.state {
            State::Owning { block, .. } => Some(block),
            State::Empty => None,
        }
    }

    /// Returns whether a block was freed.
    fn free_in_place(&mut self) -> bool {
        match mem::replace(&mut self.state, State::Empty) {
            State::Owning { allocator, block } => {
                trace!("releasing resource");
                allocator.raw_free(block);
                true
            }
            State::Empty => false,
        }
    }
}

impl ResourceHandle<'_, Heap> {
    /// Bytes of the owned allocation.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.resource().map(HeapBlock::as_slice)
    }

    /// Mutable bytes of the owned allocation.
    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.state {
            State::Owning { block, .. } => Some(block.as_mut_slice()),
            State::Empty => None,
        }
    }
}

impl<A: RawAllocator + ?Sized> Default for ResourceHandle<'_, A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A: RawAllocator + ?Sized> Drop for ResourceHandle<'_, A> {
    fn drop(&mut self) {
        self.free_in_place();
    }
}

impl<A> fmt::Debug for ResourceHandle<'_, A>
where
    A: RawAllocator + ?Sized,
    A::Block: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("state", &self.state())
            .field("resource", &self.resource())
            .finish()
    }
}
