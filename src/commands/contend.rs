//! The `contend` command: racing workers over one store.

use crate::cli::ContendArgs;
use crate::commands::{build_config, demo_payload, print_snapshot, seed_store};
use corral::error::{CorralError, Result};
use corral::owner::OwnerToken;
use corral::protocol::{CancelToken, run_protocol};
use corral::store::{RecordKey, TargetSet};

pub fn cmd_contend(args: ContendArgs) -> Result<()> {
    if args.workers == 0 {
        return Err(CorralError::UserError(
            "at least one worker is required".to_string(),
        ));
    }

    let store = seed_store(args.seed, &args.keys)?;
    let target = TargetSet::new(args.keys.iter().copied().map(RecordKey))?;
    let config = build_config(&args.retry);

    // Every worker races for the same target set against the shared store.
    // Each gets its own owner token, exactly as independent processes would.
    let reports = std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for i in 0..args.workers {
            let store = &store;
            let target = &target;
            let config = &config;
            handles.push(scope.spawn(move || {
                let owner = OwnerToken::from_id(format!("{}#{}", OwnerToken::acquire(), i));
                let report = run_protocol(
                    store,
                    target,
                    &owner,
                    config,
                    &CancelToken::new(),
                    demo_payload,
                )?;
                Ok::<_, CorralError>((owner, report))
            }));
        }

        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(CorralError::UserError("worker panicked".to_string())))
            })
            .collect::<Vec<_>>()
    });

    for result in reports {
        let (owner, report) = result?;
        println!(
            "{}: updated {} record(s) in {} attempt(s)",
            owner,
            report.updated,
            report.attempt_count()
        );
    }

    print_snapshot(&store, args.json)
}
