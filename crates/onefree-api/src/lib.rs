#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Public interfaces for onefree allocators.

mod allocator;

pub use allocator::RawAllocator;
