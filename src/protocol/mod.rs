//! The lock / mutate / release protocol.
//!
//! This module implements cooperative mutual exclusion over a record set:
//!
//! 1. **Lock** (`coordinator`): one conditional update claims every free
//!    record in the target set for the caller's owner token. The claimed
//!    count decides the outcome: a full claim enters the critical section,
//!    anything less is contention.
//! 2. **Mutate** (`executor`): with the full set confirmed, payload updates
//!    are submitted as one batch, each guarded by the caller still owning
//!    the record.
//! 3. **Release** (`guard`): ownership is released unconditionally on every
//!    exit path of the attempt, including partial claims and failed
//!    mutations. Partial claims left behind would starve other contenders
//!    forever.
//! 4. **Retry** (`retry`): contention and transient store failures back off
//!    and re-enter the cycle until success, cancellation, deadline, or the
//!    attempt budget runs out.
//!
//! Exclusivity is enforced entirely by the store's per-record conditional
//! writes; the protocol holds no client-side mutex and keeps no shared state
//! across attempts.

mod attempt;
mod coordinator;
mod executor;
mod guard;
mod retry;


// Re-export public API
pub use attempt::{AttemptOutcome, LockAttempt};
pub use coordinator::try_lock;
pub use executor::apply_payload;
pub use guard::ReleaseGuard;
pub use retry::{CancelToken, ProtocolReport, run_protocol};
