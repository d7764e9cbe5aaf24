//! Failures reported by a remote record store.

use recordsync_codec::{Record, RemoteIdentity};
use std::time::Duration;
use thiserror::Error;

/// Result type for remote store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a remote record store can report.
///
/// This is the raw taxonomy as the store describes it. The sync engine
/// classifies each variant into exactly one retry kind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The client is sending requests too fast.
    #[error("rate limited")]
    RateLimited {
        /// Store-suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The store is temporarily unavailable.
    #[error("service unavailable")]
    ServiceUnavailable {
        /// Store-suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// The record zone is busy with other writes.
    #[error("zone busy")]
    ZoneBusy {
        /// Store-suggested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// No network connection is available.
    #[error("network unavailable")]
    NetworkUnavailable,

    /// The network request failed.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The store hit an internal error.
    #[error("internal store error: {0}")]
    InternalError(String),

    /// Some items of the request failed; the rest succeeded.
    #[error("partial failure: {message}")]
    PartialFailure {
        /// Description of the failed items.
        message: String,
        /// Records the store did return.
        records: Vec<Record>,
    },

    /// The record changed on the server since the client's metadata was
    /// issued.
    #[error("server record changed")]
    ServerRecordChanged {
        /// The server's current version, if the store supplied it.
        server_record: Option<Box<Record>>,
    },

    /// The addressed record does not exist.
    #[error("unknown item: {0}")]
    UnknownItem(RemoteIdentity),

    /// The client lacks permission for the operation.
    #[error("permission failure: {0}")]
    PermissionFailure(String),

    /// The client is not authenticated with the store.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The user's storage quota is exhausted.
    #[error("quota exceeded")]
    QuotaExceeded,

    /// The request was malformed.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Any failure the store does not classify further.
    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Creates a rate limited error with a retry hint.
    pub fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited {
            retry_after: Some(retry_after),
        }
    }

    /// Creates a conflict error carrying the server's current record.
    pub fn conflict(server_record: Option<Record>) -> Self {
        Self::ServerRecordChanged {
            server_record: server_record.map(Box::new),
        }
    }

    /// Creates a partial failure carrying the records that did succeed.
    pub fn partial(message: impl Into<String>, records: Vec<Record>) -> Self {
        Self::PartialFailure {
            message: message.into(),
            records,
        }
    }

    /// Returns the store-suggested retry delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            StoreError::RateLimited { retry_after }
            | StoreError::ServiceUnavailable { retry_after }
            | StoreError::ZoneBusy { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_hints() {
        let err = StoreError::rate_limited(Duration::from_secs(3));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));

        let err = StoreError::ServiceUnavailable { retry_after: None };
        assert_eq!(err.retry_after(), None);

        assert_eq!(StoreError::NetworkUnavailable.retry_after(), None);
    }

    #[test]
    fn error_display() {
        let identity = RemoteIdentity::new("Station", "9").unwrap();
        let err = StoreError::UnknownItem(identity);
        assert_eq!(err.to_string(), "unknown item: Station:9");

        let err = StoreError::partial("1 of 3 records failed", vec![]);
        assert!(err.to_string().contains("1 of 3"));
    }
}
