mod cli;
mod scenario;

use clap::Parser;
use eyre::{Result, bail};
use onefree_core::{Heap, Slab};
use onefree_metrics::{Metered, init_logging};
use tracing::info;

use self::{
    cli::{Args, Backend},
    scenario::{Outcome, Scenario},
};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let outcome = match (args.scenario, args.backend) {
        (Scenario::RawDoubleFree, Backend::Slab) => {
            scenario::run_raw(&Slab::new(args.capacity), args.size)?
        }
        (Scenario::RawDoubleFree, Backend::Heap) => {
            bail!("raw-double-free needs the slab backend; the heap would corrupt itself")
        }
        (scenario, Backend::Slab) => {
            scenario::run(&Metered::new(Slab::new(args.capacity)), scenario, args.size)?
        }
        (scenario, Backend::Heap) => scenario::run(&Metered::new(Heap), scenario, args.size)?,
    };

    report(&outcome);

    Ok(())
}

fn report(outcome: &Outcome) {
    info!(scenario = ?outcome.scenario, "scenario finished");
    println!("{:?}: {}", outcome.scenario, outcome.detail);
    if let Some(snapshot) = outcome.snapshot {
        println!(
            "  raw_alloc: {} ok / {} failed, raw_free: {}, live: {}",
            snapshot.allocations,
            snapshot.failures,
            snapshot.frees,
            snapshot.live()
        );
    }
    if let Some(dump) = &outcome.dump {
        print!("{dump}");
    }
}
