//! Store failure classification.

use recordsync_protocol::StoreError;
use std::fmt;

/// Retry kind of a store failure.
///
/// Every `StoreError` maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The store asked the client to slow down.
    RateLimited,
    /// Network, service or zone trouble that is expected to clear.
    Transient,
    /// Some items succeeded; the returned records are usable.
    PartialFailure,
    /// The record changed on the server since our metadata was issued.
    Conflict,
    /// The addressed record does not exist.
    UnknownItem,
    /// Permission, authentication, quota or argument failures.
    Rejected,
    /// Anything else.
    Other,
}

impl ErrorKind {
    /// Classifies a store failure.
    pub fn of(error: &StoreError) -> Self {
        match error {
            StoreError::RateLimited { .. } => ErrorKind::RateLimited,
            StoreError::ServiceUnavailable { .. }
            | StoreError::ZoneBusy { .. }
            | StoreError::NetworkUnavailable
            | StoreError::NetworkFailure(_)
            | StoreError::InternalError(_) => ErrorKind::Transient,
            StoreError::PartialFailure { .. } => ErrorKind::PartialFailure,
            StoreError::ServerRecordChanged { .. } => ErrorKind::Conflict,
            StoreError::UnknownItem(_) => ErrorKind::UnknownItem,
            StoreError::PermissionFailure(_)
            | StoreError::NotAuthenticated
            | StoreError::QuotaExceeded
            | StoreError::InvalidArguments(_) => ErrorKind::Rejected,
            StoreError::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns true if the operation may be attempted again.
    ///
    /// Conflicts are retried only after reconciliation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimited | ErrorKind::Transient | ErrorKind::Conflict
        )
    }

    /// Returns true if a plain backoff is enough before retrying.
    pub fn needs_backoff(&self) -> bool {
        matches!(self, ErrorKind::RateLimited | ErrorKind::Transient)
    }

    /// Returns a short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Transient => "transient",
            ErrorKind::PartialFailure => "partial_failure",
            ErrorKind::Conflict => "conflict",
            ErrorKind::UnknownItem => "unknown_item",
            ErrorKind::Rejected => "rejected",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
