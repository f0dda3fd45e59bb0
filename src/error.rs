//! Error types for corral.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//!
//! Note that lock contention is *not* represented here: losing a race for a
//! record set is an expected control-flow outcome handled by the retry
//! scheduler, not an error condition.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for corral operations.
///
/// Each variant maps to a specific exit code used by the demo binary.
#[derive(Error, Debug)]
pub enum CorralError {
    /// Caller supplied invalid arguments (e.g., an empty target set).
    #[error("{0}")]
    UserError(String),

    /// The store could not complete a write call (transient infra failure).
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Fewer records were mutated during the critical section than were
    /// confirmed locked. This should never happen while ownership is held
    /// and indicates a concurrency-invariant violation.
    #[error(
        "partial mutation anomaly: locked {expected} record(s) but only {updated} accepted the update"
    )]
    PartialMutation {
        /// Number of records confirmed locked for this attempt.
        expected: usize,
        /// Number of records the store actually updated.
        updated: u64,
    },

    /// The retry loop was aborted before reaching success (cancellation,
    /// deadline, or attempt budget exhausted).
    #[error("protocol aborted: {0}")]
    Aborted(String),
}

impl CorralError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CorralError::UserError(_) => exit_codes::USER_ERROR,
            CorralError::StoreUnavailable(_) => exit_codes::STORE_FAILURE,
            CorralError::PartialMutation { .. } => exit_codes::ANOMALY,
            CorralError::Aborted(_) => exit_codes::ABORTED,
        }
    }
}

/// Result type alias for corral operations.
pub type Result<T> = std::result::Result<T, CorralError>;
