//! Tests for the store boundary.

use super::*;
use crate::error::CorralError;
use crate::owner::OwnerToken;
use chrono::{Duration, Utc};

fn keys(ids: &[u64]) -> Vec<RecordKey> {
    ids.iter().map(|&id| RecordKey(id)).collect()
}

#[test]
fn seeded_store_starts_free() {
    let store = MemoryStore::seeded(keys(&[1, 2, 3]));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.iter().all(|r| r.is_free() && r.payload.is_empty()));
}

#[test]
fn update_many_claims_only_free_records() {
    let store = MemoryStore::seeded(keys(&[1, 2, 3]));
    let p = OwnerToken::from_id("P");
    let q = OwnerToken::from_id("Q");

    // Pre-lock record 2 for Q
    let claimed = store
        .update_many(
            &RecordFilter::free(keys(&[2])),
            &RecordUpdate::claim(q.clone(), Utc::now()),
        )
        .unwrap();
    assert_eq!(claimed, 1);

    // P asks for all three, wins only 1 and 3
    let claimed = store
        .update_many(
            &RecordFilter::free(keys(&[1, 2, 3])),
            &RecordUpdate::claim(p.clone(), Utc::now()),
        )
        .unwrap();
    assert_eq!(claimed, 2);

    assert!(store.get(RecordKey(1)).unwrap().held_by(&p));
    assert!(store.get(RecordKey(2)).unwrap().held_by(&q));
    assert!(store.get(RecordKey(3)).unwrap().held_by(&p));
}

#[test]
fn update_many_skips_missing_keys() {
    let store = MemoryStore::seeded(keys(&[1]));

    let claimed = store
        .update_many(
            &RecordFilter::free(keys(&[1, 99])),
            &RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()),
        )
        .unwrap();
    assert_eq!(claimed, 1);
}

#[test]
fn release_is_conditional_on_owner() {
    let store = MemoryStore::seeded(keys(&[1]));
    let p = OwnerToken::from_id("P");

    store
        .update_many(
            &RecordFilter::free(keys(&[1])),
            &RecordUpdate::claim(p.clone(), Utc::now()),
        )
        .unwrap();

    // Q cannot release P's lock
    let released = store
        .update_many(
            &RecordFilter::held_by(keys(&[1]), OwnerToken::from_id("Q")),
            &RecordUpdate::release(),
        )
        .unwrap();
    assert_eq!(released, 0);
    assert!(store.get(RecordKey(1)).unwrap().held_by(&p));

    // P can
    let released = store
        .update_many(
            &RecordFilter::held_by(keys(&[1]), p),
            &RecordUpdate::release(),
        )
        .unwrap();
    assert_eq!(released, 1);
    let record = store.get(RecordKey(1)).unwrap();
    assert!(record.is_free());
    assert!(record.locked_at.is_none());
}

#[test]
fn bulk_update_counts_across_operations() {
    let store = MemoryStore::seeded(keys(&[1, 3, 5]));
    let p = OwnerToken::from_id("P");

    store
        .update_many(
            &RecordFilter::free(keys(&[1, 3, 5])),
            &RecordUpdate::claim(p.clone(), Utc::now()),
        )
        .unwrap();

    let ops: Vec<_> = [1u64, 3, 5]
        .iter()
        .map(|&id| {
            (
                RecordFilter::held_by(keys(&[id]), p.clone()),
                RecordUpdate::set_payload(format!("payload {}", id)),
            )
        })
        .collect();

    let updated = store.bulk_update(&ops).unwrap();
    assert_eq!(updated, 3);
    assert_eq!(store.get(RecordKey(3)).unwrap().payload, "payload 3");
}

#[test]
fn injected_fault_fails_write_without_mutating() {
    let store = MemoryStore::seeded(keys(&[1]));
    store.fail_next_writes(1);

    let result = store.update_many(
        &RecordFilter::free(keys(&[1])),
        &RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()),
    );
    assert!(matches!(result, Err(CorralError::StoreUnavailable(_))));
    assert!(store.get(RecordKey(1)).unwrap().is_free());

    // Fault is consumed; the next write succeeds
    let claimed = store
        .update_many(
            &RecordFilter::free(keys(&[1])),
            &RecordUpdate::claim(OwnerToken::from_id("P"), Utc::now()),
        )
        .unwrap();
    assert_eq!(claimed, 1);
}

#[test]
fn list_held_reports_owners_and_staleness() {
    let store = MemoryStore::seeded(keys(&[1, 2, 3]));
    let p = OwnerToken::from_id("P");

    store
        .update_many(
            &RecordFilter::free(keys(&[1])),
            &RecordUpdate::claim(p.clone(), Utc::now()),
        )
        .unwrap();

    // Arrange a long-held lock directly
    let mut old = Record::free(RecordKey(3));
    old.owner = Some(OwnerToken::from_id("Q"));
    old.locked_at = Some(Utc::now() - Duration::minutes(200));
    store.insert(old);

    let held = list_held(&store, &keys(&[1, 2, 3]), 120).unwrap();
    assert_eq!(held.len(), 2);

    assert_eq!(held[0].key, RecordKey(1));
    assert_eq!(held[0].owner, p);
    assert!(!held[0].is_stale);

    assert_eq!(held[1].key, RecordKey(3));
    assert!(held[1].is_stale);
    assert!(held[1].to_string().contains("STALE"));
}

#[test]
fn list_held_empty_when_all_free() {
    let store = MemoryStore::seeded(keys(&[1, 2]));
    let held = list_held(&store, &keys(&[1, 2]), 120).unwrap();
    assert!(held.is_empty());
}
