//! Document store boundary for corral.
//!
//! The protocol never talks to a concrete database; it is written against the
//! `DocumentStore` trait, which captures the two write primitives the
//! correctness argument rests on:
//!
//! - `update_many`: one conditional update over a filtered set of records,
//!   atomic **per record** (two callers racing for the same record can never
//!   both win its transition, but a caller may win only a subset of the
//!   records its filter matched).
//! - `bulk_update`: a batch of independent conditional updates submitted as
//!   one call, with no cross-operation atomicity.
//!
//! # Records
//!
//! Each record carries an owner field (`None` means free, the store-level
//! "unlocked" sentinel), the timestamp the lock was taken, and the domain
//! payload. Ownership metadata allows an external sweep to find and reap
//! orphaned locks; `list_held` produces that report.
//!
//! # In-memory backend
//!
//! `MemoryStore` implements the trait over a mutex-guarded map. It emulates
//! the *server's* per-record atomicity for tests and the demo binary; the
//! protocol itself takes no client-side locks.

mod backend;
mod filter;
mod memory;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use backend::{DocumentStore, HeldLock, list_held};
pub use filter::{OwnerChange, OwnerPredicate, RecordFilter, RecordUpdate};
pub use memory::MemoryStore;
pub use types::{Record, RecordKey, TargetSet};
