//! Per-iteration attempt records.

use crate::owner::OwnerToken;
use crate::store::TargetSet;
use chrono::{DateTime, Utc};

/// How one attempt of the lock/mutate/release cycle concluded.
///
/// Contention and store errors are recoverable control-flow outcomes, not
/// errors; the retry scheduler backs off and re-enters the cycle. A partial
/// anomaly is terminal and surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Every record was locked, mutated, and released.
    Success {
        /// Number of records whose payload was updated.
        updated: u64,
    },

    /// Fewer records were claimed than the target set requires; the partial
    /// claim was released and the attempt lost.
    Contended {
        /// Number of records this attempt won before releasing them.
        claimed: u64,
    },

    /// A lock or mutation write failed transiently.
    StoreError {
        /// Description of the failure.
        message: String,
    },

    /// The full set was locked but the mutation batch updated fewer records
    /// than were held. Invariant violation; surfaced, never retried.
    PartialAnomaly {
        /// Number of records confirmed locked.
        expected: usize,
        /// Number of records the store actually updated.
        updated: u64,
    },
}

impl AttemptOutcome {
    /// Whether this outcome is the terminal success state.
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success { .. })
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Success { updated } => {
                write!(f, "success ({} updated)", updated)
            }
            AttemptOutcome::Contended { claimed } => {
                write!(f, "contended ({} claimed)", claimed)
            }
            AttemptOutcome::StoreError { message } => {
                write!(f, "store error: {}", message)
            }
            AttemptOutcome::PartialAnomaly { expected, updated } => {
                write!(
                    f,
                    "partial anomaly ({} locked, {} updated)",
                    expected, updated
                )
            }
        }
    }
}

/// One completed iteration of the lock/mutate/release cycle.
///
/// Ephemeral per retry iteration; collected into the final `ProtocolReport`
/// for observability.
#[derive(Debug, Clone)]
pub struct LockAttempt {
    /// Token that made the attempt.
    pub owner: OwnerToken,

    /// The target set of the attempt.
    pub target: TargetSet,

    /// When the attempt started.
    pub started_at: DateTime<Utc>,

    /// How the attempt concluded.
    pub outcome: AttemptOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_success_is_success() {
        assert!(AttemptOutcome::Success { updated: 3 }.is_success());
        assert!(!AttemptOutcome::Contended { claimed: 2 }.is_success());
        assert!(
            !AttemptOutcome::StoreError {
                message: "down".to_string()
            }
            .is_success()
        );
        assert!(
            !AttemptOutcome::PartialAnomaly {
                expected: 3,
                updated: 2
            }
            .is_success()
        );
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            AttemptOutcome::Success { updated: 3 }.to_string(),
            "success (3 updated)"
        );
        assert_eq!(
            AttemptOutcome::Contended { claimed: 2 }.to_string(),
            "contended (2 claimed)"
        );
    }
}
