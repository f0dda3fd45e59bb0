//! Owner token acquisition.
//!
//! An owner token uniquely identifies one protocol caller for the duration of
//! its attempts. Tokens combine the `user@host` identity with the process ID
//! and a random nonce, so two callers in the same process (e.g., worker
//! threads in the contention demo) still get distinct tokens.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a process attempting exclusive access to records.
///
/// Compared for exact equality by the store when matching conditional
/// updates; the content is otherwise opaque to the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerToken(String);

impl OwnerToken {
    /// Acquire a fresh token for the calling process.
    pub fn acquire() -> Self {
        let nonce = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}:{}:{}",
            identity_string(),
            std::process::id(),
            &nonce[..8]
        ))
    }

    /// Build a token from a caller-supplied identifier.
    ///
    /// Useful in tests and when an external system already assigns process
    /// identities.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Get the `user@host` identity string for the calling process.
fn identity_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
