/// Primitive allocation interface that ownership handles are built on.
///
/// Implementations hand out opaque block references and take them back. They
/// do no bookkeeping on behalf of their callers: whether a block is freed once
/// is entirely up to whoever holds the reference. Methods take `&self` so that
/// any number of handles can borrow the same allocator; implementations keep
/// their mutable state behind interior mutability.
pub trait RawAllocator {
    /// Opaque reference to a single allocation.
    type Block;

    /// Allocate a resource of `size` bytes.
    ///
    /// Returns `None` when the request cannot be satisfied.
    fn raw_alloc(&self, size: usize) -> Option<Self::Block>;

    /// Return `block` to the allocator.
    fn raw_free(&self, block: Self::Block);
}

impl<A: RawAllocator + ?Sized> RawAllocator for &A {
    type Block = A::Block;

    fn raw_alloc(&self, size: usize) -> Option<Self::Block> {
        (**self).raw_alloc(size)
    }

    fn raw_free(&self, block: Self::Block) {
        (**self).raw_free(block)
    }
}
