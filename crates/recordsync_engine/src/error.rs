//! Error types for the sync engine.

use crate::classify::ErrorKind;
use recordsync_codec::CodecError;
use recordsync_protocol::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The store reported a failure that is not retried.
    #[error("{kind} store failure: {source}")]
    Store {
        /// Classified kind.
        kind: ErrorKind,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },

    /// A retryable failure persisted until the attempt ceiling.
    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of store calls made.
        attempts: u32,
        /// The last failure observed.
        last: StoreError,
    },

    /// A record could not be mapped to or from an entity.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A background task failed before producing a result.
    #[error("background task failed: {0}")]
    Background(String),

    /// The completion queue is no longer running.
    #[error("completion queue closed")]
    CompletionClosed,
}

impl SyncError {
    /// Wraps a store error with its classified kind.
    pub fn store(source: StoreError) -> Self {
        Self::Store {
            kind: ErrorKind::of(&source),
            source,
        }
    }

    /// Returns the kind of the underlying store failure, if any.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            SyncError::Store { kind, .. } => Some(*kind),
            SyncError::RetriesExhausted { last, .. } => Some(ErrorKind::of(last)),
            _ => None,
        }
    }

    /// Returns the underlying store error, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            SyncError::Store { source, .. } => Some(source),
            SyncError::RetriesExhausted { last, .. } => Some(last),
            _ => None,
        }
    }

    /// Returns true if a later, independent attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Store { kind, .. } => kind.is_retryable(),
            SyncError::RetriesExhausted { .. } => true,
            SyncError::Background(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_wraps_kind() {
        let err = SyncError::store(StoreError::NotAuthenticated);
        assert_eq!(err.kind(), Some(ErrorKind::Rejected));
        assert!(!err.is_retryable());
        assert_eq!(err.store_error(), Some(&StoreError::NotAuthenticated));
    }

    #[test]
    fn exhausted_keeps_last_cause() {
        let err = SyncError::RetriesExhausted {
            attempts: 10,
            last: StoreError::NetworkUnavailable,
        };
        assert_eq!(err.kind(), Some(ErrorKind::Transient));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("10 attempts"));
        assert!(err.to_string().contains("network unavailable"));
    }

    #[test]
    fn codec_errors_convert() {
        let err: SyncError = CodecError::missing_field("name").into();
        assert!(matches!(err, SyncError::Codec(_)));
        assert_eq!(err.kind(), None);
        assert!(!err.is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SyncError::CompletionClosed.to_string(),
            "completion queue closed"
        );
        let err = SyncError::store(StoreError::QuotaExceeded);
        assert_eq!(err.to_string(), "rejected store failure: quota exceeded");
    }
}
