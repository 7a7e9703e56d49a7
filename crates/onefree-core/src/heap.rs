//! Resources backed by the global system allocator.

use core::{alloc::Layout, ptr::NonNull};
use std::alloc;

use onefree_api::RawAllocator;

/// Alignment of every heap block.
const ALIGN: usize = 16;

/// [`RawAllocator`] over the process-wide system allocator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Heap;

/// One zeroed allocation obtained from [`Heap`].
///
/// Not `Clone`: freeing consumes the block, so a heap block cannot be handed
/// back to the system allocator twice.
#[derive(Debug)]
pub struct HeapBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl HeapBlock {
    /// Address of the allocation.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Number of bytes actually reserved. Zero-size requests reserve one byte.
    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always false; see [`HeapBlock::len`].
    pub fn is_empty(&self) -> bool {
        false
    }

    /// View the allocation as bytes.
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is a live, zero-initialised allocation of `layout.size()` bytes.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    /// View the allocation as mutable bytes.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as for `as_slice`; `&mut self` guarantees exclusive access.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl RawAllocator for Heap {
    type Block = HeapBlock;

    fn raw_alloc(&self, size: usize) -> Option<HeapBlock> {
        let layout = Layout::from_size_align(size.max(1), ALIGN).ok()?;
        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(ptr).map(|ptr| HeapBlock { ptr, layout })
    }

    fn raw_free(&self, block: HeapBlock) {
        // SAFETY: `block` came from `raw_alloc` with this exact layout and is
        // consumed here, so it cannot be freed again.
        unsafe { alloc::dealloc(block.ptr.as_ptr(), block.layout) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_zeroed_and_writable() {
        let mut block = Heap.raw_alloc(8).expect("allocation");
        assert_eq!(block.len(), 8);
        assert_eq!(block.as_ptr() as usize % ALIGN, 0);
        assert!(block.as_slice().iter().all(|&b| b == 0));
        block.as_mut_slice().copy_from_slice(b"onefree!");
        assert_eq!(block.as_slice(), b"onefree!");
        Heap.raw_free(block);
    }

    #[test]
    fn zero_size_reserves_one_byte() {
        let block = Heap.raw_alloc(0).expect("allocation");
        assert_eq!(block.len(), 1);
        Heap.raw_free(block);
    }

    #[test]
    fn impossible_layout_fails() {
        assert!(Heap.raw_alloc(usize::MAX).is_none());
    }
}
