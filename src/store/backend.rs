//! The `DocumentStore` trait and held-lock reporting.

use crate::error::Result;
use crate::owner::OwnerToken;
use crate::store::filter::{RecordFilter, RecordUpdate};
use crate::store::types::{Record, RecordKey};
use chrono::{DateTime, Utc};

/// Write interface the protocol requires from a document store.
///
/// Implementations must guarantee that each record's filter-check-and-update
/// is atomic: two concurrent `update_many` calls whose filters match the same
/// record can never both observe it matching. Nothing stronger is assumed;
/// a single call may transition only a subset of its requested keys when
/// other owners hold the rest.
pub trait DocumentStore {
    /// Execute one conditional update over all records matching `filter`.
    ///
    /// Returns the number of records that matched at write time and were
    /// mutated. Fails with `StoreUnavailable` when the call cannot complete;
    /// on failure no record is mutated by this call.
    fn update_many(&self, filter: &RecordFilter, update: &RecordUpdate) -> Result<u64>;

    /// Execute a batch of independent conditional updates in one call.
    ///
    /// Returns the total matched count across all operations. Operations are
    /// independent; the batch provides no cross-operation atomicity.
    fn bulk_update(&self, ops: &[(RecordFilter, RecordUpdate)]) -> Result<u64>;

    /// Fetch the current state of the given records.
    ///
    /// Missing keys are skipped. Read-only; used for reporting, never for
    /// protocol decisions.
    fn find(&self, keys: &[RecordKey]) -> Result<Vec<Record>>;
}

/// Report entry for a record currently held by some owner.
#[derive(Debug, Clone)]
pub struct HeldLock {
    /// Key of the held record.
    pub key: RecordKey,

    /// Token of the current owner.
    pub owner: OwnerToken,

    /// When the lock was acquired.
    pub locked_at: DateTime<Utc>,

    /// Whether the lock has exceeded the staleness threshold.
    pub is_stale: bool,
}

impl HeldLock {
    /// Format the lock's age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = Utc::now().signed_duration_since(self.locked_at);
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

impl std::fmt::Display for HeldLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "record {} (owner: {}, age: {}{})",
            self.key,
            self.owner,
            self.age_string(),
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// List the currently held records among `keys`, flagging stale locks.
///
/// This is the observation half of the orphan-lock cleanup a real deployment
/// needs: a companion sweep would reap entries whose owner is dead or whose
/// age exceeds a reasonable timeout. The sweep itself is not part of the
/// protocol.
pub fn list_held<S: DocumentStore + ?Sized>(
    store: &S,
    keys: &[RecordKey],
    stale_minutes: u32,
) -> Result<Vec<HeldLock>> {
    let mut held = Vec::new();

    for record in store.find(keys)? {
        let (Some(owner), Some(locked_at)) = (record.owner.clone(), record.locked_at) else {
            continue;
        };
        held.push(HeldLock {
            key: record.key,
            owner,
            locked_at,
            is_stale: record.is_stale(stale_minutes),
        });
    }

    // Sort by key for consistent output
    held.sort_by_key(|lock| lock.key);

    Ok(held)
}
