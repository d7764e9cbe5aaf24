//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while mapping between entities and records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A remote identity string could not be parsed.
    #[error("invalid remote identity {identity:?}: {message}")]
    InvalidIdentity {
        /// The offending identity string.
        identity: String,
        /// Description of the problem.
        message: String,
    },

    /// The identity or record belongs to a different entity type.
    #[error("record type mismatch: expected {expected}, got {actual}")]
    RecordTypeMismatch {
        /// Record type the codec handles.
        expected: String,
        /// Record type that was supplied.
        actual: String,
    },

    /// A natural key could not be parsed from its string form.
    #[error("invalid natural key {key:?}: {message}")]
    InvalidKey {
        /// The key text.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// A required field is absent from the record.
    #[error("missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// A field holds a value of the wrong type.
    #[error("field {field} has type {actual}, expected {expected}")]
    FieldType {
        /// Field name.
        field: String,
        /// Expected value type.
        expected: &'static str,
        /// Actual value type.
        actual: &'static str,
    },

    /// Archiving record metadata failed.
    #[error("metadata archive failed: {message}")]
    ArchiveFailed {
        /// Description of the error.
        message: String,
    },

    /// Restoring record metadata from an archive failed.
    #[error("metadata unarchive failed: {message}")]
    UnarchiveFailed {
        /// Description of the error.
        message: String,
    },
}

impl CodecError {
    /// Create an invalid identity error.
    pub fn invalid_identity(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// Create an invalid key error.
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a record type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::RecordTypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CodecError::missing_field("name");
        assert_eq!(err.to_string(), "missing required field: name");

        let err = CodecError::type_mismatch("Station", "Brand");
        assert!(err.to_string().contains("Station"));
        assert!(err.to_string().contains("Brand"));
    }
}
