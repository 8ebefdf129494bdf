//! # Error Types
//!
//! Structured error types for bridge_core. The layout pipeline itself never
//! fails: out-of-range input is clamped and degenerate geometry is collapsed.
//! These errors belong to the interface layer around it (form validation,
//! project lookups, file I/O).
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::errors::{BridgeError, BridgeResult};
//!
//! fn validate_girders(num_girders: u32) -> BridgeResult<()> {
//!     if num_girders < 2 {
//!         return Err(BridgeError::invalid_input(
//!             "num_girders",
//!             num_girders.to_string(),
//!             "At least two girders are required",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_girders(1).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bridge_core operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Structured error type for interface-layer operations.
///
/// Each variant carries enough context for a caller (or a status bar) to
/// explain what went wrong without parsing the message.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BridgeError {
    /// An input value is outside the range the parameter form accepts
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// No design with the given label exists in the project
    #[error("Design not found: {label}")]
    DesignNotFound { label: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl BridgeError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BridgeError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DesignNotFound error
    pub fn design_not_found(label: impl Into<String>) -> Self {
        BridgeError::DesignNotFound { label: label.into() }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        BridgeError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        BridgeError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything displayable
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        BridgeError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::InvalidInput { .. } => "INVALID_INPUT",
            BridgeError::DesignNotFound { .. } => "DESIGN_NOT_FOUND",
            BridgeError::FileError { .. } => "FILE_ERROR",
            BridgeError::FileLocked { .. } => "FILE_LOCKED",
            BridgeError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BridgeError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BridgeError::invalid_input(
            "span_length_mm",
            "5000",
            "Span must be between 20 m and 45 m",
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: BridgeError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BridgeError::design_not_found("Main span").error_code(), "DESIGN_NOT_FOUND");
        assert_eq!(BridgeError::serialization("bad json").error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(BridgeError::file_locked("a.bridge", "someone", "now").is_recoverable());
        assert!(!BridgeError::file_error("open", "a.bridge", "missing").is_recoverable());
    }
}
