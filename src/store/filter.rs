//! Conditional filter and update value types.
//!
//! These are the wire-level arguments of the store's conditional writes. The
//! match and apply semantics live here so that every backend interprets a
//! filter/update pair identically.

use crate::owner::OwnerToken;
use crate::store::types::{Record, RecordKey};
use chrono::{DateTime, Utc};

/// Ownership condition a record must satisfy for an update to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerPredicate {
    /// The record must be unowned.
    Free,
    /// The record must be held by exactly this token.
    HeldBy(OwnerToken),
}

/// Filter selecting the records a conditional update applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Keys the update is restricted to.
    pub keys: Vec<RecordKey>,

    /// Ownership condition each record must satisfy at write time.
    pub owner: OwnerPredicate,
}

impl RecordFilter {
    /// Filter matching free records among the given keys.
    pub fn free(keys: impl Into<Vec<RecordKey>>) -> Self {
        Self {
            keys: keys.into(),
            owner: OwnerPredicate::Free,
        }
    }

    /// Filter matching records held by `token` among the given keys.
    pub fn held_by(keys: impl Into<Vec<RecordKey>>, token: OwnerToken) -> Self {
        Self {
            keys: keys.into(),
            owner: OwnerPredicate::HeldBy(token),
        }
    }

    /// Whether the filter matches the record's current state.
    pub fn matches(&self, record: &Record) -> bool {
        if !self.keys.contains(&record.key) {
            return false;
        }
        match &self.owner {
            OwnerPredicate::Free => record.is_free(),
            OwnerPredicate::HeldBy(token) => record.held_by(token),
        }
    }
}

/// Change to a record's ownership fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerChange {
    /// Claim the record: set the owner token and stamp the lock time.
    Claim {
        /// Token taking ownership.
        token: OwnerToken,
        /// Acquisition timestamp.
        at: DateTime<Utc>,
    },
    /// Release the record: clear the owner token and lock time.
    Release,
}

/// Mutation applied to every record a filter matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Ownership change, if any.
    pub owner: Option<OwnerChange>,

    /// New payload value, if any.
    pub payload: Option<String>,
}

impl RecordUpdate {
    /// Update claiming ownership for `token` at the given time.
    pub fn claim(token: OwnerToken, at: DateTime<Utc>) -> Self {
        Self {
            owner: Some(OwnerChange::Claim { token, at }),
            payload: None,
        }
    }

    /// Update releasing ownership.
    pub fn release() -> Self {
        Self {
            owner: Some(OwnerChange::Release),
            payload: None,
        }
    }

    /// Update replacing the payload, leaving ownership untouched.
    pub fn set_payload(payload: impl Into<String>) -> Self {
        Self {
            owner: None,
            payload: Some(payload.into()),
        }
    }

    /// Apply the update to a record in place.
    pub fn apply(&self, record: &mut Record) {
        match &self.owner {
            Some(OwnerChange::Claim { token, at }) => {
                record.owner = Some(token.clone());
                record.locked_at = Some(*at);
            }
            Some(OwnerChange::Release) => {
                record.owner = None;
                record.locked_at = None;
            }
            None => {}
        }
        if let Some(payload) = &self.payload {
            record.payload = payload.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_filter_matches_only_free_records() {
        let filter = RecordFilter::free(vec![RecordKey(1), RecordKey(3)]);

        let free = Record::free(RecordKey(1));
        assert!(filter.matches(&free));

        let mut held = Record::free(RecordKey(3));
        RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()).apply(&mut held);
        assert!(!filter.matches(&held));

        // Key outside the filter never matches
        let other = Record::free(RecordKey(2));
        assert!(!filter.matches(&other));
    }

    #[test]
    fn held_by_filter_requires_exact_owner() {
        let filter = RecordFilter::held_by(vec![RecordKey(1)], OwnerToken::from_id("P"));

        let mut record = Record::free(RecordKey(1));
        assert!(!filter.matches(&record));

        RecordUpdate::claim(OwnerToken::from_id("Q"), Utc::now()).apply(&mut record);
        assert!(!filter.matches(&record));

        RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()).apply(&mut record);
        assert!(filter.matches(&record));
    }

    #[test]
    fn claim_then_release_round_trip() {
        let mut record = Record::free(RecordKey(1));

        RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()).apply(&mut record);
        assert!(record.held_by(&OwnerToken::from_id("P")));
        assert!(record.locked_at.is_some());

        RecordUpdate::release().apply(&mut record);
        assert!(record.is_free());
        assert!(record.locked_at.is_none());
    }

    #[test]
    fn payload_update_preserves_ownership() {
        let mut record = Record::free(RecordKey(1));
        RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()).apply(&mut record);

        RecordUpdate::set_payload("hello").apply(&mut record);
        assert_eq!(record.payload, "hello");
        assert!(record.held_by(&OwnerToken::from_id("P")));
    }
}
