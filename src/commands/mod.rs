//! Command implementations for the corral demo binary.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the helpers shared by both commands (config
//! assembly, store seeding, snapshot printing).

mod contend;
mod run;

use crate::cli::{Command, RetryArgs};
use corral::config::{BackoffPolicy, ProtocolConfig};
use corral::error::{CorralError, Result};
use corral::owner::OwnerToken;
use corral::store::{MemoryStore, Record, RecordKey};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::cmd_run(args),
        Command::Contend(args) => contend::cmd_contend(args),
    }
}

/// The reference payload mutation: a formatted string embedding the record
/// key and the owning process token.
pub(crate) fn demo_payload(key: RecordKey, owner: &OwnerToken) -> String {
    format!("Record {} was updated by process:{}", key, owner)
}

/// Build a protocol config from CLI retry options.
pub(crate) fn build_config(retry: &RetryArgs) -> ProtocolConfig {
    let backoff = if retry.exponential {
        BackoffPolicy::Exponential {
            initial_ms: retry.backoff_ms,
            max_ms: retry.max_backoff_ms,
            jitter: true,
        }
    } else {
        BackoffPolicy::Fixed {
            delay_ms: retry.backoff_ms,
        }
    };

    ProtocolConfig {
        backoff,
        max_attempts: retry.max_attempts,
        deadline_ms: retry.deadline_ms,
    }
}

/// Seed a fresh store with free records for keys `1..=seed`, ensuring every
/// target key exists even when it falls outside the seed range.
pub(crate) fn seed_store(seed: u64, keys: &[u64]) -> Result<MemoryStore> {
    if keys.is_empty() {
        return Err(CorralError::UserError(
            "at least one record key is required".to_string(),
        ));
    }

    let store = MemoryStore::seeded((1..=seed).map(RecordKey));
    for &key in keys {
        if key > seed {
            store.insert(Record::free(RecordKey(key)));
        }
    }
    Ok(store)
}

/// Print the store's final record state.
pub(crate) fn print_snapshot(store: &MemoryStore, json: bool) -> Result<()> {
    let snapshot = store.snapshot();

    if json {
        let rendered = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| CorralError::UserError(format!("failed to render snapshot: {}", e)))?;
        println!("{}", rendered);
    } else {
        for record in snapshot {
            let owner = record
                .owner
                .as_ref()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unlocked".to_string());
            println!(
                "record {}: owner={} payload={:?}",
                record.key, owner, record.payload
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RetryArgs;

    fn retry_args() -> RetryArgs {
        RetryArgs {
            backoff_ms: 500,
            exponential: false,
            max_backoff_ms: 8000,
            max_attempts: None,
            deadline_ms: None,
        }
    }

    #[test]
    fn build_config_fixed_by_default() {
        let config = build_config(&retry_args());
        assert_eq!(config.backoff, BackoffPolicy::Fixed { delay_ms: 500 });
        assert!(config.max_attempts.is_none());
    }

    #[test]
    fn build_config_exponential_with_jitter() {
        let mut args = retry_args();
        args.exponential = true;
        args.backoff_ms = 100;

        let config = build_config(&args);
        assert_eq!(
            config.backoff,
            BackoffPolicy::Exponential {
                initial_ms: 100,
                max_ms: 8000,
                jitter: true,
            }
        );
    }

    #[test]
    fn seed_store_covers_out_of_range_keys() {
        let store = seed_store(3, &[1, 9]).unwrap();
        assert!(store.get(RecordKey(2)).is_some());
        assert!(store.get(RecordKey(9)).is_some());
        assert!(store.get(RecordKey(4)).is_none());
    }

    #[test]
    fn seed_store_rejects_empty_keys() {
        assert!(seed_store(3, &[]).is_err());
    }

    #[test]
    fn demo_payload_matches_reference_format() {
        let payload = demo_payload(RecordKey(1), &OwnerToken::from_id("P"));
        assert_eq!(payload, "Record 1 was updated by process:P");
    }
}
