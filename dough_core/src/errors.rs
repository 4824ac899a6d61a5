//! # Error Types
//!
//! Structured error types for dough_core. Every engine error is raised before
//! any state is mutated, so the caller can surface the message and carry on
//! with the previous (still valid) formula.
//!
//! ## Example
//!
//! ```rust
//! use dough_core::errors::{DoughError, DoughResult};
//!
//! fn validate_flour(flour_g: f64) -> DoughResult<()> {
//!     if flour_g <= 0.0 {
//!         return Err(DoughError::invalid_input(
//!             "flourWeight",
//!             flour_g.to_string(),
//!             "Flour weight must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for dough_core operations
pub type DoughResult<T> = Result<T, DoughError>;

/// Message shown when a lock change would over-constrain the formula.
pub const TOO_MANY_LOCKS: &str = "Too many fields locked. Please unlock another field first.";

/// Structured error type for engine, book and file operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum DoughError {
    /// The requested lock set is over-constrained
    #[error("{message}")]
    InvalidLockCombination { message: String },

    /// The field cannot be locked (only doughWeight, flourWeight, hydration, starter can)
    #[error("Field '{field}' is not lockable.")]
    UnlockableField { field: String },

    /// Empty or zero-sum flour blend
    #[error("Invalid flour blend: {reason}")]
    InvalidBlend { reason: String },

    /// An input value is invalid (negative, non-finite, unknown key)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A saved formula or blend preset does not exist
    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: String, id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// Formula book is locked by another user/process
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

    /// Configuration file could not be read or parsed
    #[error("Config error in '{path}': {reason}")]
    ConfigError { path: String, reason: String },
}

impl DoughError {
    /// Create an InvalidLockCombination error with the standard message
    pub fn too_many_locks() -> Self {
        DoughError::InvalidLockCombination {
            message: TOO_MANY_LOCKS.to_string(),
        }
    }

    /// Create an UnlockableField error
    pub fn unlockable_field(field: impl Into<String>) -> Self {
        DoughError::UnlockableField {
            field: field.into(),
        }
    }

    /// Create an InvalidBlend error
    pub fn invalid_blend(reason: impl Into<String>) -> Self {
        DoughError::InvalidBlend {
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DoughError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a RecordNotFound error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        DoughError::RecordNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DoughError::FileError {
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
        DoughError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from any displayable cause
    pub fn serialization(reason: impl ToString) -> Self {
        DoughError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DoughError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            DoughError::InvalidLockCombination { .. } => "INVALID_LOCK_COMBINATION",
            DoughError::UnlockableField { .. } => "UNLOCKABLE_FIELD",
            DoughError::InvalidBlend { .. } => "INVALID_BLEND",
            DoughError::InvalidInput { .. } => "INVALID_INPUT",
            DoughError::RecordNotFound { .. } => "RECORD_NOT_FOUND",
            DoughError::FileError { .. } => "FILE_ERROR",
            DoughError::FileLocked { .. } => "FILE_LOCKED",
            DoughError::SerializationError { .. } => "SERIALIZATION_ERROR",
            DoughError::VersionMismatch { .. } => "VERSION_MISMATCH",
            DoughError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}
