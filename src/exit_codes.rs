//! Exit code constants for the corral binary.
//!
//! - 0: Success
//! - 1: User error (bad args, empty target set)
//! - 2: Store failure (write call could not complete)
//! - 3: Partial mutation anomaly (invariant violation)
//! - 4: Aborted (cancellation, deadline, or attempt budget exhausted)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an invalid target set.
pub const USER_ERROR: i32 = 1;

/// Store failure: a lock, mutate, or unlock write could not complete.
pub const STORE_FAILURE: i32 = 2;

/// Partial mutation anomaly: fewer records mutated than were locked.
pub const ANOMALY: i32 = 3;

/// Aborted: the retry loop was cancelled or exhausted its budget.
pub const ABORTED: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, STORE_FAILURE, ANOMALY, ABORTED];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
