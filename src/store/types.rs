//! Record and target-set definitions.

use crate::error::{CorralError, Result};
use crate::owner::OwnerToken;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Unique key of a record in the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordKey {
    fn from(key: u64) -> Self {
        Self(key)
    }
}

/// A persisted record subject to cooperative locking.
///
/// `owner == None` is the free state; `locked_at` is `None` exactly when the
/// record is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique key of the record.
    pub key: RecordKey,

    /// Token of the owner currently holding the lock, if any.
    pub owner: Option<OwnerToken>,

    /// Timestamp when the lock was acquired (RFC3339); `None` when free.
    pub locked_at: Option<DateTime<Utc>>,

    /// Domain data subject to mutation while the record is held.
    pub payload: String,
}

impl Record {
    /// Create a free record with an empty payload.
    pub fn free(key: RecordKey) -> Self {
        Self {
            key,
            owner: None,
            locked_at: None,
            payload: String::new(),
        }
    }

    /// Whether the record is currently unowned.
    pub fn is_free(&self) -> bool {
        self.owner.is_none()
    }

    /// Whether the record is currently held by the given token.
    pub fn held_by(&self, token: &OwnerToken) -> bool {
        self.owner.as_ref() == Some(token)
    }

    /// How long the current lock has been held, if the record is held.
    pub fn lock_age(&self) -> Option<Duration> {
        self.locked_at
            .map(|at| Utc::now().signed_duration_since(at))
    }

    /// Check if a held lock is stale based on the given threshold in minutes.
    ///
    /// Free records are never stale.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.lock_age()
            .is_some_and(|age| age.num_minutes() > stale_minutes as i64)
    }
}

/// The ordered, deduplicated, non-empty set of record keys one attempt must
/// lock, mutate, and unlock as a single logical unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    keys: Vec<RecordKey>,
}

impl TargetSet {
    /// Build a target set from the given keys.
    ///
    /// Keys are sorted and deduplicated. Fails with `UserError` when the
    /// result would be empty: the protocol has nothing meaningful to do with
    /// an empty set, and `claimed == len` would degenerate to vacuous success.
    pub fn new(keys: impl IntoIterator<Item = RecordKey>) -> Result<Self> {
        let mut keys: Vec<RecordKey> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        if keys.is_empty() {
            return Err(CorralError::UserError(
                "target set must contain at least one record key".to_string(),
            ));
        }

        Ok(Self { keys })
    }

    /// The keys in the set, in ascending order.
    pub fn keys(&self) -> &[RecordKey] {
        &self.keys
    }

    /// Number of records in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false; the constructor rejects empty sets.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the set contains the given key.
    pub fn contains(&self, key: RecordKey) -> bool {
        self.keys.binary_search(&key).is_ok()
    }
}

impl std::fmt::Display for TargetSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", key)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_record_has_no_owner_or_timestamp() {
        let record = Record::free(RecordKey(1));
        assert!(record.is_free());
        assert!(record.locked_at.is_none());
        assert!(record.lock_age().is_none());
        assert!(!record.is_stale(0));
    }

    #[test]
    fn held_by_matches_exact_token() {
        let mut record = Record::free(RecordKey(1));
        record.owner = Some(OwnerToken::from_id("P"));
        record.locked_at = Some(Utc::now());

        assert!(record.held_by(&OwnerToken::from_id("P")));
        assert!(!record.held_by(&OwnerToken::from_id("Q")));
        assert!(!record.is_free());
    }

    #[test]
    fn old_lock_is_stale() {
        let mut record = Record::free(RecordKey(1));
        record.owner = Some(OwnerToken::from_id("P"));
        record.locked_at = Some(Utc::now() - Duration::minutes(150));

        assert!(record.is_stale(120));
        assert!(!record.is_stale(200));
    }

    #[test]
    fn target_set_sorts_and_dedupes() {
        let target =
            TargetSet::new([RecordKey(5), RecordKey(1), RecordKey(3), RecordKey(5)]).unwrap();
        assert_eq!(
            target.keys(),
            &[RecordKey(1), RecordKey(3), RecordKey(5)]
        );
        assert_eq!(target.len(), 3);
        assert!(target.contains(RecordKey(3)));
        assert!(!target.contains(RecordKey(2)));
    }

    #[test]
    fn empty_target_set_is_rejected() {
        let result = TargetSet::new([]);
        assert!(matches!(result, Err(CorralError::UserError(_))));
    }

    #[test]
    fn target_set_display() {
        let target = TargetSet::new([RecordKey(1), RecordKey(3), RecordKey(5)]).unwrap();
        assert_eq!(target.to_string(), "{1,3,5}");
    }
}
