//! Property tests for the single-release guarantee.
//!
//! Arbitrary sequences of acquire, move and release operations are applied to
//! a small set of handle slots over a metered slab. Whatever the sequence, the
//! slab sees at most one free per allocation, and every allocation is freed
//! exactly once by the time the slots are dropped.

use std::collections::HashSet;

use onefree_core::{BLOCK_SIZE, ResourceHandle, Slab, acquire, release, transfer};
use onefree_metrics::{MeterSnapshot, Metered};
use proptest::prelude::*;

const SLOTS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    /// Overwrite a slot with a fresh handle.
    Acquire { slot: usize, size: usize },
    /// Move ownership out of a slot and release it, twice.
    ReleaseTwice { slot: usize },
    /// Move ownership from one slot to another.
    Move { from: usize, to: usize },
    /// Move ownership through `transfer` and back into the same slot.
    Transfer { slot: usize },
    /// Release in place.
    Reset { slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let slot = 0..SLOTS;
    prop_oneof![
        (slot.clone(), 0usize..64).prop_map(|(slot, size)| Op::Acquire { slot, size }),
        slot.clone().prop_map(|slot| Op::ReleaseTwice { slot }),
        (slot.clone(), slot.clone()).prop_map(|(from, to)| Op::Move { from, to }),
        slot.clone().prop_map(|slot| Op::Transfer { slot }),
        slot.prop_map(|slot| Op::Reset { slot }),
    ]
}

fn apply<'a>(meter: &'a Metered<Slab>, slots: &mut [ResourceHandle<'a, Metered<Slab>>], op: &Op) {
    match *op {
        Op::Acquire { slot, size } => {
            slots[slot] = acquire(meter, size).expect("slab has a spare block");
        }
        Op::ReleaseTwice { slot } => {
            release(slots[slot].take());
            release(slots[slot].take());
        }
        Op::Move { from, to } => {
            let moved = slots[from].take();
            slots[to] = moved;
        }
        Op::Transfer { slot } => {
            let moved = transfer(slots[slot].take());
            slots[slot] = moved;
        }
        Op::Reset { slot } => slots[slot].reset(),
    }
}

proptest! {
    #[test]
    fn every_allocation_is_freed_exactly_once(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let meter = Metered::new(Slab::new((SLOTS + 1) * BLOCK_SIZE));
        {
            let mut slots: Vec<ResourceHandle<'_, Metered<Slab>>> =
                (0..SLOTS).map(|_| ResourceHandle::empty()).collect();

            for op in &ops {
                apply(&meter, &mut slots, op);

                let snapshot = meter.snapshot();
                let owning = slots.iter().filter(|h| h.is_owning()).count() as u64;
                prop_assert_eq!(snapshot.live(), owning);
                prop_assert!(snapshot.frees <= snapshot.allocations);

                let blocks: HashSet<_> =
                    slots.iter().filter_map(|h| h.resource().copied()).collect();
                prop_assert_eq!(blocks.len() as u64, owning);
                prop_assert_eq!(meter.inner().free_blocks() as u64, SLOTS as u64 + 1 - owning);
            }
        }

        let snapshot = meter.snapshot();
        prop_assert_eq!(snapshot.frees, snapshot.allocations);
        prop_assert_eq!(snapshot.failures, 0);
        prop_assert_eq!(meter.inner().free_blocks(), meter.inner().total_blocks());
    }

    #[test]
    fn repeated_release_frees_once(releases in 1usize..8) {
        let meter = Metered::new(Slab::new(BLOCK_SIZE));
        let mut handle = acquire(&meter, 4).expect("acquire");
        for _ in 0..releases {
            release(handle.take());
        }
        release(handle);
        prop_assert_eq!(
            meter.snapshot(),
            MeterSnapshot { allocations: 1, failures: 0, frees: 1 }
        );
    }
}

#[test]
fn scenario_release_twice() {
    let meter = Metered::new(Slab::new(BLOCK_SIZE));
    let mut h = acquire(&meter, 4).expect("acquire");
    assert!(h.is_owning());

    release(h.take());
    assert_eq!(meter.snapshot().frees, 1);
    assert!(h.is_empty());

    release(h);
    assert_eq!(meter.snapshot().frees, 1);
}

#[test]
fn scenario_transfer_then_release() {
    let meter = Metered::new(Slab::new(BLOCK_SIZE));
    let mut h1 = acquire(&meter, 4).expect("acquire");
    let block = *h1.resource().expect("owning");

    let h2 = transfer(h1.take());
    assert_eq!(h2.resource(), Some(&block));

    release(h1);
    assert_eq!(meter.snapshot().frees, 0);
    release(h2);
    assert_eq!(meter.snapshot().frees, 1);
    assert!(!meter.inner().is_live(block));
}

#[test]
fn scenario_exhaustion() {
    let meter = Metered::new(Slab::new(0));
    let err = acquire(&meter, 4).expect_err("slab has no blocks");
    assert_eq!(err.size, 4);
    assert_eq!(
        meter.snapshot(),
        MeterSnapshot { allocations: 0, failures: 1, frees: 0 }
    );
}

#[test]
fn round_trip_frees_the_acquired_block() {
    let meter = Metered::new(Slab::new(BLOCK_SIZE));
    let h = acquire(&meter, 16).expect("acquire");
    let block = *h.resource().expect("owning");
    let mut moved = transfer(h);
    release(moved.take());
    release(moved);
    assert!(!meter.inner().is_live(block));
    assert_eq!(meter.snapshot().frees, 1);
}
