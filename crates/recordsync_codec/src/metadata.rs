//! Store-issued record metadata.

use crate::error::{CodecError, CodecResult};
use crate::identity::RemoteIdentity;
use serde::{Deserialize, Serialize};

/// Opaque version token the remote store issues with every fetched or
/// saved record.
///
/// Entities carry it unchanged and never interpret it. The store compares
/// `change_tag` against its current version to detect concurrent writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Identity of the record this metadata belongs to.
    pub identity: RemoteIdentity,
    /// Store version tag.
    pub change_tag: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,
    /// Last modification time in milliseconds since the Unix epoch.
    pub modified_at: i64,
}

impl RecordMetadata {
    /// Creates metadata for a record.
    pub fn new(identity: RemoteIdentity, change_tag: impl Into<String>) -> Self {
        Self {
            identity,
            change_tag: change_tag.into(),
            created_at: 0,
            modified_at: 0,
        }
    }

    /// Sets the creation and modification timestamps.
    pub fn with_timestamps(mut self, created_at: i64, modified_at: i64) -> Self {
        self.created_at = created_at;
        self.modified_at = modified_at;
        self
    }

    /// Returns the record type of the owning record.
    pub fn record_type(&self) -> &str {
        self.identity.record_type()
    }

    /// Archives the metadata to CBOR bytes for local persistence.
    pub fn archive(&self) -> CodecResult<Vec<u8>> {
        let mut bytes = Vec::new();
        ciborium::into_writer(self, &mut bytes).map_err(|e| CodecError::ArchiveFailed {
            message: e.to_string(),
        })?;
        Ok(bytes)
    }

    /// Restores metadata from bytes produced by [`archive`](Self::archive).
    pub fn unarchive(bytes: &[u8]) -> CodecResult<Self> {
        ciborium::from_reader(bytes).map_err(|e| CodecError::UnarchiveFailed {
            message: e.to_string(),
        })
    }
}
