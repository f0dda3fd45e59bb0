//! Lock coordination: claiming the target set.

use crate::error::Result;
use crate::owner::OwnerToken;
use crate::store::{DocumentStore, RecordFilter, RecordUpdate, TargetSet};
use chrono::Utc;
use tracing::debug;

/// Try to claim every free record in the target set for `owner`.
///
/// Issues a single conditional update: records whose key is in the target
/// set *and* whose owner field is free get the caller's token and a lock
/// timestamp. Returns the number of records actually claimed; the caller
/// must compare it against `target.len()` before entering the critical
/// section.
///
/// The claim mutates the subset it won even when the attempt as a whole
/// loses, so the caller's release guard must run over partial claims too.
pub fn try_lock<S: DocumentStore + ?Sized>(
    store: &S,
    target: &TargetSet,
    owner: &OwnerToken,
) -> Result<u64> {
    let filter = RecordFilter::free(target.keys().to_vec());
    let update = RecordUpdate::claim(owner.clone(), Utc::now());

    let claimed = store.update_many(&filter, &update)?;
    debug!(%owner, %target, claimed, expected = target.len(), "lock attempt");

    Ok(claimed)
}
