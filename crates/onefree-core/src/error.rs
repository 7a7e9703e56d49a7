use thiserror::Error;

/// The allocator could not produce a resource.
///
/// Returned by [`acquire`](crate::acquire) when the underlying allocation
/// primitive reports exhaustion. No handle exists in that case, so there is
/// nothing to release.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("allocator could not satisfy a request for {size} bytes")]
pub struct AllocationError {
    /// Size of the rejected request.
    pub size: usize,
}
