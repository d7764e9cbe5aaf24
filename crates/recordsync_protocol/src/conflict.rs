//! Conflict resolution policy.

use serde::{Deserialize, Serialize};

/// How a version conflict is merged before an upload is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The freshly downloaded remote fields replace the local ones.
    ServerWins,
    /// Local fields are kept; only the remote version token is adopted.
    ClientWins,
}

impl ConflictPolicy {
    /// Returns true if remote fields overwrite local ones on conflict.
    pub fn adopts_remote_fields(&self) -> bool {
        matches!(self, ConflictPolicy::ServerWins)
    }
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        ConflictPolicy::ServerWins
    }
}
