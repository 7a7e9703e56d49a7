//! Fixed-block slab allocator.
//!
//! The slab manages a preallocated region of memory divided into fixed-size
//! blocks. Each block stores the requested length followed by the payload:
//!
//! ```text
//! [ Len (4 bytes) ][ Payload ]
//! ```
//!
//! Block references are plain indices ([`BlockId`]) and are `Copy`, so nothing
//! stops a caller from freeing the same block twice. The slab notices, because
//! it knows which blocks sit on its freelist.

use core::cell::RefCell;

use onefree_api::RawAllocator;
use thiserror::Error;

// Layout constants ---------------------------------------------------------
const LEN_OFFSET: usize = 0;
const LEN_SIZE: usize = 4; // u32
const HEADER_SIZE: usize = LEN_OFFSET + LEN_SIZE;
/// Fixed block size used by this allocator.
pub const BLOCK_SIZE: usize = 512; // bytes
/// Largest payload a single block can hold.
pub const MAX_PAYLOAD: usize = BLOCK_SIZE - HEADER_SIZE;

/// Index of a block inside a [`Slab`].
///
/// Carries no ownership: copies of a `BlockId` all name the same block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Position of the block in the slab region.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Errors reported by [`Slab::try_deallocate`] and [`Slab::with_payload`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlabError {
    /// The block index lies outside the slab.
    #[error("block {} is outside the slab", .0.index())]
    OutOfRange(BlockId),

    /// The block is already on the freelist.
    #[error("block {} already freed", .0.index())]
    DoubleFree(BlockId),
}

/// Memory slab allocator using a simple freelist.
#[derive(Debug)]
pub struct Slab {
    inner: RefCell<Region>,
}

#[derive(Debug)]
struct Region {
    /// Contiguous bytes backing the slab.
    bytes: Box<[u8]>,
    /// Total number of blocks in the region.
    total_blocks: usize,
    /// Indices of currently free blocks.
    free_list: Vec<usize>,
}

/// Initialise a freelist containing `n` block indices in LIFO order.
fn init_freelist(n: usize) -> Vec<usize> {
    let mut list = Vec::with_capacity(n);
    for idx in (0..n).rev() {
        list.push(idx);
    }
    list
}

impl Region {
    fn block(&self, index: usize) -> &[u8] {
        let offset = index * BLOCK_SIZE;
        &self.bytes[offset..offset + BLOCK_SIZE]
    }

    fn block_mut(&mut self, index: usize) -> &mut [u8] {
        let offset = index * BLOCK_SIZE;
        &mut self.bytes[offset..offset + BLOCK_SIZE]
    }

    fn check_live(&self, id: BlockId) -> Result<(), SlabError> {
        if id.0 >= self.total_blocks {
            return Err(SlabError::OutOfRange(id));
        }
        if self.free_list.contains(&id.0) {
            return Err(SlabError::DoubleFree(id));
        }
        Ok(())
    }

    fn payload_len(&self, index: usize) -> usize {
        let block = self.block(index);
        let len_bytes = &block[LEN_OFFSET..LEN_OFFSET + LEN_SIZE];
        u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize
    }
}

impl Slab {
    /// Create a new slab capable of storing at most `capacity_bytes` of data.
    ///
    /// Memory is divided into 512-byte blocks; the total capacity is truncated
    /// to a multiple of the block size.
    pub fn new(capacity_bytes: usize) -> Self {
        let total_blocks = capacity_bytes / BLOCK_SIZE;
        let bytes = vec![0u8; total_blocks * BLOCK_SIZE].into_boxed_slice();

        let free_list = init_freelist(total_blocks);

        Self {
            inner: RefCell::new(Region {
                bytes,
                total_blocks,
                free_list,
            }),
        }
    }

    /// Total number of blocks in the slab.
    pub fn total_blocks(&self) -> usize {
        self.inner.borrow().total_blocks
    }

    /// Number of blocks currently available for allocation.
    pub fn free_blocks(&self) -> usize {
        self.inner.borrow().free_list.len()
    }

    /// Allocate a block able to hold `size` payload bytes.
    ///
    /// Returns `None` if the slab is full or `size` exceeds [`MAX_PAYLOAD`].
    pub fn allocate(&self, size: usize) -> Option<BlockId> {
        if size > MAX_PAYLOAD {
            return None;
        }

        let mut region = self.inner.borrow_mut();
        let index = region.free_list.pop()?;
        let block = region.block_mut(index);

        // Encode payload length (u32 LE). The payload itself is already zeroed.
        let len = size as u32;
        block[LEN_OFFSET..LEN_OFFSET + LEN_SIZE].copy_from_slice(&len.to_le_bytes());

        Some(BlockId(index))
    }

    /// Whether `id` names a block that is currently allocated.
    pub fn is_live(&self, id: BlockId) -> bool {
        self.inner.borrow().check_live(id).is_ok()
    }

    /// Payload length recorded for a live block.
    pub fn len_of(&self, id: BlockId) -> Option<usize> {
        let region = self.inner.borrow();
        region.check_live(id).ok()?;
        Some(region.payload_len(id.0))
    }

    /// Run `f` over the payload bytes of a live block.
    ///
    /// The slab is borrowed for the duration of `f`; calling back into the
    /// same slab from inside `f` panics.
    pub fn with_payload<R>(
        &self,
        id: BlockId,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, SlabError> {
        let mut region = self.inner.borrow_mut();
        region.check_live(id)?;
        let len = region.payload_len(id.0);
        let block = region.block_mut(id.0);
        Ok(f(&mut block[HEADER_SIZE..HEADER_SIZE + len]))
    }

    /// Deallocate the block referenced by `id` and return it to the freelist.
    ///
    /// Freeing a block that is already free is reported instead of corrupting
    /// the freelist.
    pub fn try_deallocate(&self, id: BlockId) -> Result<(), SlabError> {
        let mut region = self.inner.borrow_mut();
        region.check_live(id)?;
        // Zero out the block so the next owner starts from a clean payload.
        region.block_mut(id.0).fill(0);
        region.free_list.push(id.0);
        Ok(())
    }

    /// Dump the raw contents of the block for debugging purposes.
    pub fn debug_dump(&self, id: BlockId) -> Option<String> {
        let region = self.inner.borrow();
        if id.0 >= region.total_blocks {
            return None;
        }
        let block = region.block(id.0);
        let mut out = String::new();
        for (i, chunk) in block.chunks(16).enumerate() {
            let hex: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            out.push_str(&format!("{:04x}: {:<48} {}\n", i * 16, hex, ascii));
        }
        Some(out)
    }
}

impl RawAllocator for Slab {
    type Block = BlockId;

    fn raw_alloc(&self, size: usize) -> Option<BlockId> {
        self.allocate(size)
    }

    /// # Panics
    ///
    /// Panics if `block` is already free or does not belong to this slab.
    fn raw_free(&self, block: BlockId) {
        if let Err(err) = self.try_deallocate(block) {
            panic!("{err}");
        }
    }
}
