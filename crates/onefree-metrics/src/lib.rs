#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Metrics instrumentation for onefree allocators.

/// Counter metrics.
pub mod counter;
/// Histogram metrics.
pub mod histogram;
/// Allocator instrumentation.
pub mod metered;
/// Tracing utilities.
pub mod trace;

pub use counter::Counter;
pub use histogram::Histogram;
pub use metered::{Metered, MeterSnapshot};
pub use trace::init_logging;
