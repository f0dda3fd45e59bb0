//! In-memory document store backend.

use crate::error::{CorralError, Result};
use crate::store::backend::DocumentStore;
use crate::store::filter::{RecordFilter, RecordUpdate};
use crate::store::types::{Record, RecordKey};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// An in-memory document store.
///
/// Suitable for unit tests, integration tests, and the demo binary. The
/// internal mutex emulates the server side of the store: it provides the
/// per-record conditional-write atomicity the protocol's correctness rests
/// on. Protocol callers share a `MemoryStore` across threads the same way
/// independent processes would share a database.
///
/// Write faults can be injected with `fail_next_writes` to exercise the
/// protocol's store-error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<RecordKey, Record>>,
    faults: Mutex<FaultPlan>,
}

/// Pending injected write failures.
#[derive(Debug, Default)]
struct FaultPlan {
    /// Write calls to let through before failing.
    skip: u32,
    /// Write calls to fail after the skip window.
    fail: u32,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with free, empty-payload records for `keys`.
    pub fn seeded(keys: impl IntoIterator<Item = RecordKey>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.lock();
            for key in keys {
                records.insert(key, Record::free(key));
            }
        }
        store
    }

    /// Insert or replace a record, bypassing conditional-write semantics.
    ///
    /// Useful for arranging test fixtures (e.g., a record pre-locked by
    /// another owner).
    pub fn insert(&self, record: Record) {
        self.records.lock().insert(record.key, record);
    }

    /// Snapshot of all records, in key order.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.lock().values().cloned().collect()
    }

    /// Fetch a single record by key.
    pub fn get(&self, key: RecordKey) -> Option<Record> {
        self.records.lock().get(&key).cloned()
    }

    /// Make the next `n` write calls fail with `StoreUnavailable`.
    ///
    /// A failed call mutates nothing, matching the all-or-nothing per-call
    /// semantics of the modeled store.
    pub fn fail_next_writes(&self, n: u32) {
        self.fail_writes_after(0, n);
    }

    /// Let `skip` write calls through, then fail the following `n`.
    ///
    /// Lets a test target a specific write within an attempt, e.g. failing
    /// the mutation batch while the preceding lock write succeeds.
    pub fn fail_writes_after(&self, skip: u32, n: u32) {
        *self.faults.lock() = FaultPlan { skip, fail: n };
    }

    /// Consume one step of the fault plan, if armed.
    fn take_fault(&self) -> Result<()> {
        let mut plan = self.faults.lock();
        if plan.skip > 0 {
            plan.skip -= 1;
            return Ok(());
        }
        if plan.fail > 0 {
            plan.fail -= 1;
            return Err(CorralError::StoreUnavailable(
                "injected write failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn update_many(&self, filter: &RecordFilter, update: &RecordUpdate) -> Result<u64> {
        self.take_fault()?;

        let mut records = self.records.lock();
        let mut matched = 0u64;
        for key in &filter.keys {
            if let Some(record) = records.get_mut(key)
                && filter.matches(record)
            {
                update.apply(record);
                matched += 1;
            }
        }
        Ok(matched)
    }

    fn bulk_update(&self, ops: &[(RecordFilter, RecordUpdate)]) -> Result<u64> {
        // One fault per call: the batch is a single round trip to the store.
        self.take_fault()?;

        let mut records = self.records.lock();
        let mut matched = 0u64;
        for (filter, update) in ops {
            for key in &filter.keys {
                if let Some(record) = records.get_mut(key)
                    && filter.matches(record)
                {
                    update.apply(record);
                    matched += 1;
                }
            }
        }
        Ok(matched)
    }

    fn find(&self, keys: &[RecordKey]) -> Result<Vec<Record>> {
        let records = self.records.lock();
        Ok(keys
            .iter()
            .filter_map(|key| records.get(key).cloned())
            .collect())
    }
}
