//! Protocol configuration.
//!
//! `ProtocolConfig` controls the retry scheduler: how long to wait between
//! attempts, and when to give up. Defaults match the reference scenario
//! (fixed 500 ms backoff, unbounded retries); production deployments should
//! switch to jittered exponential backoff and supply a deadline or attempt
//! budget so the loop cannot spin forever.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default fixed backoff interval in milliseconds.
fn default_backoff_ms() -> u64 {
    500
}

/// Default cap for exponential backoff in milliseconds.
fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_true() -> bool {
    true
}

/// Backoff policy applied between protocol attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// Wait a constant interval between attempts.
    Fixed {
        /// Interval in milliseconds.
        #[serde(default = "default_backoff_ms")]
        delay_ms: u64,
    },
    /// Double the interval each failed attempt, bounded by `max_ms`.
    ///
    /// With `jitter` enabled each delay is scaled by a random factor in
    /// [0.5, 1.0] to break up thundering herds of retrying contenders.
    Exponential {
        /// Interval before the first retry, in milliseconds.
        #[serde(default = "default_backoff_ms")]
        initial_ms: u64,
        /// Upper bound on any single delay, in milliseconds.
        #[serde(default = "default_max_backoff_ms")]
        max_ms: u64,
        /// Whether to randomize each delay.
        #[serde(default = "default_true")]
        jitter: bool,
    },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        BackoffPolicy::Fixed {
            delay_ms: default_backoff_ms(),
        }
    }
}

/// Configuration for one protocol run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Backoff policy between attempts.
    pub backoff: BackoffPolicy,

    /// Maximum number of attempts before aborting (unbounded when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Wall-clock budget for the whole run in milliseconds (unbounded when
    /// absent). Checked before each attempt and during backoff waits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl ProtocolConfig {
    /// The deadline as a `Duration`, if one is configured.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_is_fixed_500ms() {
        assert_eq!(
            BackoffPolicy::default(),
            BackoffPolicy::Fixed { delay_ms: 500 }
        );
    }

    #[test]
    fn default_config_is_unbounded() {
        let config = ProtocolConfig::default();
        assert!(config.max_attempts.is_none());
        assert!(config.deadline_ms.is_none());
        assert!(config.deadline().is_none());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ProtocolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.backoff, BackoffPolicy::Fixed { delay_ms: 500 });
        assert!(config.max_attempts.is_none());
    }

    #[test]
    fn exponential_backoff_deserializes_with_defaults() {
        let policy: BackoffPolicy =
            serde_json::from_str(r#"{"strategy": "exponential"}"#).unwrap();
        assert_eq!(
            policy,
            BackoffPolicy::Exponential {
                initial_ms: 500,
                max_ms: 8_000,
                jitter: true,
            }
        );
    }

    #[test]
    fn deadline_converts_to_duration() {
        let config = ProtocolConfig {
            deadline_ms: Some(1_500),
            ..Default::default()
        };
        assert_eq!(config.deadline(), Some(Duration::from_millis(1_500)));
    }
}
