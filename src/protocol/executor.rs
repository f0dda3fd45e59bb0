//! Critical section execution: batched payload mutation.

use crate::error::{CorralError, Result};
use crate::owner::OwnerToken;
use crate::store::{DocumentStore, RecordFilter, RecordKey, RecordUpdate, TargetSet};
use tracing::debug;

/// Apply the payload mutation to every record in the target set.
///
/// Precondition: the caller has confirmed a full claim (`claimed ==
/// target.len()`) for this exact `owner` in the current attempt.
///
/// Each record's update is derived by `compute` and submitted as one batched
/// call, every operation guarded by the record still being owned by the
/// caller's token. With exclusive ownership held, all guards should pass;
/// a shortfall means the ownership invariant was violated somewhere and is
/// surfaced as `PartialMutation` rather than silently ignored.
pub fn apply_payload<S, F>(
    store: &S,
    target: &TargetSet,
    owner: &OwnerToken,
    compute: F,
) -> Result<u64>
where
    S: DocumentStore + ?Sized,
    F: Fn(RecordKey, &OwnerToken) -> String,
{
    let ops: Vec<(RecordFilter, RecordUpdate)> = target
        .keys()
        .iter()
        .map(|&key| {
            (
                RecordFilter::held_by(vec![key], owner.clone()),
                RecordUpdate::set_payload(compute(key, owner)),
            )
        })
        .collect();

    let updated = store.bulk_update(&ops)?;
    debug!(%owner, %target, updated, "payload mutation");

    if updated != target.len() as u64 {
        return Err(CorralError::PartialMutation {
            expected: target.len(),
            updated,
        });
    }

    Ok(updated)
}
