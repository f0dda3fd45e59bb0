//! The `run` command: one protocol run as a single caller.

use crate::cli::RunArgs;
use crate::commands::{build_config, demo_payload, print_snapshot, seed_store};
use corral::error::Result;
use corral::owner::OwnerToken;
use corral::protocol::{CancelToken, run_protocol};
use corral::store::{RecordKey, TargetSet};

pub fn cmd_run(args: RunArgs) -> Result<()> {
    let store = seed_store(args.seed, &args.keys)?;
    let target = TargetSet::new(args.keys.iter().copied().map(RecordKey))?;
    let owner = OwnerToken::acquire();
    let config = build_config(&args.retry);

    let report = run_protocol(
        &store,
        &target,
        &owner,
        &config,
        &CancelToken::new(),
        demo_payload,
    )?;

    println!(
        "Updated {} record(s) in {} attempt(s) as {}",
        report.updated,
        report.attempt_count(),
        owner
    );
    print_snapshot(&store, args.json)
}
