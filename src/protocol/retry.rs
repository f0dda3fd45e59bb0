//! Retry scheduling: the attempt loop, backoff, and cancellation.

use crate::config::{BackoffPolicy, ProtocolConfig};
use crate::error::{CorralError, Result};
use crate::owner::OwnerToken;
use crate::protocol::attempt::{AttemptOutcome, LockAttempt};
use crate::protocol::coordinator::try_lock;
use crate::protocol::executor::apply_payload;
use crate::protocol::guard::ReleaseGuard;
use crate::store::{DocumentStore, RecordKey, TargetSet};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Granularity at which backoff waits re-check cancellation.
const WAIT_SLICE: Duration = Duration::from_millis(25);

/// Shared flag for aborting a retry loop from outside.
///
/// Clone the token and hand one half to the running protocol; calling
/// `cancel` makes the loop surface `Aborted` at its next check (before an
/// attempt or during a backoff wait). Cancellation never interrupts an
/// attempt mid-flight, so the release guard always gets to run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Outcome of a completed protocol run.
#[derive(Debug)]
pub struct ProtocolReport {
    /// Every attempt made, in order; the last one is the success.
    pub attempts: Vec<LockAttempt>,

    /// Number of records whose payload was updated.
    pub updated: u64,
}

impl ProtocolReport {
    /// Number of attempts the run took.
    pub fn attempt_count(&self) -> usize {
        self.attempts.len()
    }
}

/// Run the full lock/mutate/release protocol until success or abort.
///
/// Each iteration claims the target set, runs the payload mutation only on a
/// full claim, and releases unconditionally. Contention and transient store
/// failures back off per `config.backoff` and retry; retries are unbounded
/// unless `config` sets a deadline or attempt budget, or `cancel` is
/// triggered.
///
/// `compute` derives the new payload for each record and must be a pure
/// function of its inputs, so a retried or repeated run converges to the
/// same final state.
///
/// # Errors
///
/// - `Aborted`: cancellation, deadline, or attempt budget exhausted.
/// - `PartialMutation`: the critical section updated fewer records than were
///   locked (invariant violation; the set is still released first).
pub fn run_protocol<S, F>(
    store: &S,
    target: &TargetSet,
    owner: &OwnerToken,
    config: &ProtocolConfig,
    cancel: &CancelToken,
    compute: F,
) -> Result<ProtocolReport>
where
    S: DocumentStore + ?Sized,
    F: Fn(RecordKey, &OwnerToken) -> String,
{
    let started = Instant::now();
    let deadline_at = config.deadline().map(|d| started + d);
    let mut attempts: Vec<LockAttempt> = Vec::new();

    loop {
        if cancel.is_cancelled() {
            return Err(CorralError::Aborted(format!(
                "cancelled after {} attempt(s)",
                attempts.len()
            )));
        }
        if let Some(at) = deadline_at
            && Instant::now() >= at
        {
            return Err(CorralError::Aborted(format!(
                "deadline exceeded after {} attempt(s)",
                attempts.len()
            )));
        }
        if let Some(max) = config.max_attempts
            && attempts.len() as u32 >= max
        {
            return Err(CorralError::Aborted(format!(
                "attempt budget of {} exhausted",
                max
            )));
        }

        let attempt_started = Utc::now();

        // Registered before the lock write: a lock call that fails after
        // claiming a subset still gets its claim released. Idempotent when
        // nothing was claimed.
        let guard = ReleaseGuard::new(store, target, owner.clone());

        let outcome = match try_lock(store, target, owner) {
            Ok(claimed) if claimed == target.len() as u64 => {
                match apply_payload(store, target, owner, &compute) {
                    Ok(updated) => AttemptOutcome::Success { updated },
                    Err(CorralError::PartialMutation { expected, updated }) => {
                        AttemptOutcome::PartialAnomaly { expected, updated }
                    }
                    Err(CorralError::StoreUnavailable(message)) => {
                        AttemptOutcome::StoreError { message }
                    }
                    Err(other) => {
                        // Not produced by the executor; guard drop releases.
                        return Err(other);
                    }
                }
            }
            Ok(claimed) => AttemptOutcome::Contended { claimed },
            Err(CorralError::StoreUnavailable(message)) => AttemptOutcome::StoreError { message },
            Err(other) => {
                return Err(other);
            }
        };

        if let Err(e) = guard.release() {
            warn!(%owner, %target, error = %e,
                "release failed; orphaned locks left for the cleanup sweep");
        }

        debug!(%owner, %target, attempt = attempts.len() + 1, %outcome, "attempt concluded");
        attempts.push(LockAttempt {
            owner: owner.clone(),
            target: target.clone(),
            started_at: attempt_started,
            outcome: outcome.clone(),
        });

        match outcome {
            AttemptOutcome::Success { updated } => {
                return Ok(ProtocolReport { attempts, updated });
            }
            AttemptOutcome::PartialAnomaly { expected, updated } => {
                return Err(CorralError::PartialMutation { expected, updated });
            }
            AttemptOutcome::Contended { .. } | AttemptOutcome::StoreError { .. } => {
                let delay = backoff_delay(&config.backoff, attempts.len() as u32);
                wait_backoff(delay, cancel, deadline_at);
            }
        }
    }
}

/// Compute the delay before the next attempt.
///
/// `completed` is the number of attempts made so far (at least 1).
fn backoff_delay(policy: &BackoffPolicy, completed: u32) -> Duration {
    match policy {
        BackoffPolicy::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
        BackoffPolicy::Exponential {
            initial_ms,
            max_ms,
            jitter,
        } => {
            let exponent = completed.saturating_sub(1).min(32);
            let raw = initial_ms
                .saturating_mul(1u64.checked_shl(exponent).unwrap_or(u64::MAX))
                .min(*max_ms);

            let ms = if *jitter {
                let factor: f64 = rand::thread_rng().gen_range(0.5..=1.0);
                (raw as f64 * factor) as u64
            } else {
                raw
            };
            Duration::from_millis(ms)
        }
    }
}

/// Sleep for `delay`, waking early on cancellation or deadline expiry.
fn wait_backoff(delay: Duration, cancel: &CancelToken, deadline_at: Option<Instant>) {
    let until = Instant::now() + delay;
    loop {
        if cancel.is_cancelled() {
            return;
        }
        let now = Instant::now();
        if now >= until {
            return;
        }
        if let Some(at) = deadline_at
            && now >= at
        {
            return;
        }
        std::thread::sleep(WAIT_SLICE.min(until - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let policy = BackoffPolicy::Fixed { delay_ms: 500 };
        assert_eq!(backoff_delay(&policy, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(&policy, 10), Duration::from_millis(500));
    }

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let policy = BackoffPolicy::Exponential {
            initial_ms: 100,
            max_ms: 1_000,
            jitter: false,
        };
        assert_eq!(backoff_delay(&policy, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&policy, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&policy, 3), Duration::from_millis(400));
        assert_eq!(backoff_delay(&policy, 5), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(&policy, 60), Duration::from_millis(1_000));
    }

    #[test]
    fn jittered_backoff_stays_in_bounds() {
        let policy = BackoffPolicy::Exponential {
            initial_ms: 1_000,
            max_ms: 8_000,
            jitter: true,
        };
        for _ in 0..50 {
            let delay = backoff_delay(&policy, 1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1_000));
        }
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn wait_backoff_returns_early_on_cancel() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let start = Instant::now();
        wait_backoff(Duration::from_secs(5), &cancel, None);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
