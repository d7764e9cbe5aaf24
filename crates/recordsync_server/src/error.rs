//! Error types for the reference server.

use recordsync_codec::{Record, RemoteIdentity};
use recordsync_protocol::StoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the reference server.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerError {
    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The record does not exist.
    #[error("record not found: {0}")]
    NotFound(RemoteIdentity),

    /// The client's change tag does not match the stored one.
    #[error("version mismatch for {identity}: client {client:?}, server {server}")]
    VersionMismatch {
        /// Addressed record.
        identity: RemoteIdentity,
        /// Change tag the client sent, if any.
        client: Option<String>,
        /// Change tag the server holds.
        server: String,
        /// The server's current record.
        current: Box<Record>,
    },

    /// The continuation cursor is unknown or expired.
    #[error("unknown cursor: {0}")]
    UnknownCursor(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns true if the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidRequest(_)
                | ServerError::NotFound(_)
                | ServerError::VersionMismatch { .. }
                | ServerError::UnknownCursor(_)
        )
    }

    /// Returns true if the server was at fault.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ServerError::Internal(_))
    }
}

impl From<ServerError> for StoreError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(message) => StoreError::InvalidArguments(message),
            ServerError::NotFound(identity) => StoreError::UnknownItem(identity),
            ServerError::VersionMismatch { current, .. } => StoreError::ServerRecordChanged {
                server_record: Some(current),
            },
            ServerError::UnknownCursor(token) => {
                StoreError::InvalidArguments(format!("unknown cursor {token}"))
            }
            ServerError::Internal(message) => StoreError::InternalError(message),
        }
    }
}
