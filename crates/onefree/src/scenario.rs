//! Scripted walks through the ownership rules.
//!
//! Each scenario drives the handle operations the way a caller would and
//! checks what the allocator observed. A broken expectation is returned as an
//! error so the process exits non-zero.

use clap::ValueEnum;
use eyre::{Result, bail, ensure};
use onefree_core::{
    RawAllocator, RawHandle, ResourceHandle, Slab, SlabError, acquire, release, transfer,
};
use onefree_metrics::{MeterSnapshot, Metered};
use tracing::{debug, warn};

/// Upper bound on handles held while trying to exhaust an allocator.
const EXHAUST_LIMIT: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Release the same owning handle twice
    ReleaseTwice,
    /// Transfer ownership, then release both the source and the destination
    TransferThenRelease,
    /// Acquire until the allocator gives up
    Exhaust,
    /// Release a raw, untracked pointer twice
    RawDoubleFree,
}

#[derive(Debug)]
pub struct Outcome {
    pub scenario: Scenario,
    pub detail: String,
    pub snapshot: Option<MeterSnapshot>,
    /// Raw contents of the block the scenario freed.
    pub dump: Option<String>,
}

/// Run one of the tracked-handle scenarios against `meter`.
pub fn run<A: RawAllocator>(
    meter: &Metered<A>,
    scenario: Scenario,
    size: usize,
) -> Result<Outcome> {
    let detail = match scenario {
        Scenario::ReleaseTwice => release_twice(meter, size)?,
        Scenario::TransferThenRelease => transfer_then_release(meter, size)?,
        Scenario::Exhaust => exhaust(meter, size)?,
        Scenario::RawDoubleFree => bail!("raw-double-free does not use owning handles"),
    };

    let snapshot = meter.snapshot();
    ensure!(
        snapshot.frees == snapshot.allocations,
        "{} allocations but {} frees",
        snapshot.allocations,
        snapshot.frees
    );

    Ok(Outcome {
        scenario,
        detail,
        snapshot: Some(snapshot),
        dump: None,
    })
}

fn release_twice<A: RawAllocator>(meter: &Metered<A>, size: usize) -> Result<String> {
    let mut h = acquire(meter, size)?;
    ensure!(h.is_owning(), "fresh handle does not own its resource");

    release(h.take());
    ensure!(meter.snapshot().frees == 1, "first release did not free");
    ensure!(h.is_empty(), "released slot still owns a resource");

    release(h);
    ensure!(meter.snapshot().frees == 1, "second release freed again");

    Ok("second release was a no-op".to_owned())
}

fn transfer_then_release<A: RawAllocator>(meter: &Metered<A>, size: usize) -> Result<String> {
    let mut h1 = acquire(meter, size)?;
    let h2 = transfer(h1.take());
    ensure!(h1.is_empty(), "source still owns after transfer");
    ensure!(h2.is_owning(), "destination does not own after transfer");

    release(h1);
    ensure!(meter.snapshot().frees == 0, "releasing the moved-from handle freed");

    release(h2);
    ensure!(meter.snapshot().frees == 1, "destination release did not free exactly once");

    Ok("moved-from release was a no-op, destination freed once".to_owned())
}

fn exhaust<A: RawAllocator>(meter: &Metered<A>, size: usize) -> Result<String> {
    let mut held: Vec<ResourceHandle<'_, Metered<A>>> = Vec::new();
    let err = loop {
        let request = if held.len() < EXHAUST_LIMIT { size } else { usize::MAX };
        match acquire(meter, request) {
            Ok(h) => held.push(h),
            Err(err) => break err,
        }
    };
    debug!(held = held.len(), "allocator exhausted");
    let count = held.len();
    drop(held);

    Ok(format!("{err} after {count} successful acquisitions"))
}

/// Release one raw slab pointer twice and report what the slab saw.
pub fn run_raw(slab: &Slab, size: usize) -> Result<Outcome> {
    let p = RawHandle::acquire(slab, size)?;
    p.release(slab)?;

    let detail = match p.release(slab) {
        Err(err @ SlabError::DoubleFree(_)) => {
            warn!(%err, "double free");
            format!("second release rejected: {err}")
        }
        Err(err) => bail!(err),
        Ok(()) => bail!("second release of a raw pointer went unnoticed"),
    };

    Ok(Outcome {
        scenario: Scenario::RawDoubleFree,
        detail,
        snapshot: None,
        dump: slab.debug_dump(p.block()),
    })
}
