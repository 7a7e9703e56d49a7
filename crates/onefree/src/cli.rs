use clap::{Parser, ValueEnum};

use crate::scenario::Scenario;

/// Compare releasing an untracked pointer twice with releasing an owning handle twice
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Scenario to run
    #[arg(value_enum)]
    pub scenario: Scenario,

    /// Allocator backing the resources
    #[arg(long, value_enum, default_value_t = Backend::Slab)]
    pub backend: Backend,

    /// Bytes requested per resource
    #[arg(long, default_value_t = 4)]
    pub size: usize,

    /// Slab capacity in bytes
    #[arg(long, default_value_t = 4096)]
    pub capacity: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Fixed-block slab that detects double frees
    Slab,
    /// System allocator
    Heap,
}
