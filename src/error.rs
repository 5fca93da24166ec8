//! Error types for dxf-tags

use std::io;
use thiserror::Error;

/// Main error type for tag stream and entity operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred during stream operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Structural error in the tag stream (bad group code line, truncated tag)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A numeric value line that does not parse for its group code class
    #[error("Malformed numeric field: code {code} at line {line}: '{value}'")]
    MalformedValue { code: i32, line: usize, value: String },

    /// The stream was closed after an earlier I/O failure
    #[error("Stream closed after a previous read error")]
    StreamClosed,

    /// No descriptor is registered for this entity type name
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// A write-side invariant was violated; the entity is skipped
    #[error("Invalid {entity}{}: {reason}", .handle.map(|h| format!(" (handle {h:X})")).unwrap_or_default())]
    InvalidEntity {
        entity: String,
        handle: Option<u64>,
        reason: String,
    },

    /// The entity cannot be written at the target format version
    #[error("{entity} requires {required} or later, target is {version}")]
    UnsupportedVersion {
        entity: String,
        required: String,
        version: String,
    },

    /// Freeing a record that still links to a successor
    #[error("Record {0} is still chained to a successor; unlink it first")]
    ChainedRecord(usize),

    /// Record id not present in the store
    #[error("Record not found: {0}")]
    RecordNotFound(usize),

    /// A field was accessed or assigned with the wrong value shape
    #[error("Field '{field}' of {entity} is not a {expected}")]
    FieldType {
        entity: String,
        field: String,
        expected: &'static str,
    },

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for dxf-tags operations
pub type Result<T> = std::result::Result<T, DxfError>;

impl From<String> for DxfError {
    fn from(s: String) -> Self {
        DxfError::Custom(s)
    }
}

impl From<&str> for DxfError {
    fn from(s: &str) -> Self {
        DxfError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_value_display() {
        let err = DxfError::MalformedValue {
            code: 40,
            line: 12,
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed numeric field: code 40 at line 12: 'abc'"
        );
    }

    #[test]
    fn test_invalid_entity_with_handle() {
        let err = DxfError::InvalidEntity {
            entity: "ARC".to_string(),
            handle: Some(0x1A),
            reason: "start angle equals end angle".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid ARC (handle 1A): start angle equals end angle"
        );
    }

    #[test]
    fn test_invalid_entity_without_handle() {
        let err = DxfError::InvalidEntity {
            entity: "APPID".to_string(),
            handle: None,
            reason: "empty name".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid APPID: empty name");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let dxf_err: DxfError = io_err.into();
        assert!(matches!(dxf_err, DxfError::Io(_)));
    }
}
