//! Error types for stackform.
//!
//! All errors use `thiserror` so callers get readable messages with the
//! offending field, path or captured command output attached.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stackform operations.
pub type Result<T> = std::result::Result<T, StackformError>;

/// Main error type for stackform.
#[derive(Error, Debug)]
pub enum StackformError {
    // Declaration errors
    #[error("Type mismatch at {field}: expected {expected}, found {found}")]
    TypeMismatch { field: String, expected: &'static str, found: &'static str },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value at {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("Declaration parse error: {reason}")]
    DeclarationParse { reason: String },

    // Rendering errors
    #[error(
        "extra_config key '{key}' of service '{service}' collides with a field stackform renders itself"
    )]
    ExtraConfigConflict { service: String, key: String },

    #[error("Cannot serialize {path}: {reason}")]
    SerializationError { path: String, reason: String },

    // External engine errors
    #[error("Failed to invoke `{command}`: {reason}\n{output}")]
    ExternalInvocationError { command: String, reason: String, output: String },

    #[error("Error running docker compose for stack {stack}: {output}")]
    ApplyFailed { stack: String, output: String },

    // File system errors
    #[error("I/O error at {path:?}: {source}")]
    FilesystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl StackformError {
    /// Build a `TypeMismatch` for `field`.
    pub fn mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch { field: field.into(), expected, found }
    }

    /// Build a `FilesystemError` for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemError { path: path.into(), source }
    }
}
