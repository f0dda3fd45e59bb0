//! Corral: cooperative document-level locking over a shared record store.
//!
//! Corral serializes updates to a chosen set of records across arbitrarily
//! many independent processes, with no dedicated lock server. Each caller
//! runs the same lock/mutate/release cycle; exclusivity rests entirely on
//! the store's per-record conditional-write atomicity.
//!
//! # Overview
//!
//! - `store`: the `DocumentStore` boundary, record/target-set types, and an
//!   in-memory backend for tests and demos.
//! - `protocol`: lock coordination, the critical-section executor, the
//!   release guard, and the retry scheduler.
//! - `owner`: owner-token acquisition.
//! - `config`: backoff and retry-budget configuration.
//!
//! # Example
//!
//! ```
//! use corral::config::ProtocolConfig;
//! use corral::owner::OwnerToken;
//! use corral::protocol::{CancelToken, run_protocol};
//! use corral::store::{MemoryStore, RecordKey, TargetSet};
//!
//! let store = MemoryStore::seeded([RecordKey(1), RecordKey(3), RecordKey(5)]);
//! let target = TargetSet::new([RecordKey(1), RecordKey(3), RecordKey(5)])?;
//! let owner = OwnerToken::acquire();
//!
//! let report = run_protocol(
//!     &store,
//!     &target,
//!     &owner,
//!     &ProtocolConfig::default(),
//!     &CancelToken::new(),
//!     |key, owner| format!("Record {} was updated by process:{}", key, owner),
//! )?;
//! assert_eq!(report.updated, 3);
//! # Ok::<(), corral::error::CorralError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod owner;
pub mod protocol;
pub mod store;
