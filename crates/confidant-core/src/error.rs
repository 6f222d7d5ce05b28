//! Error types for the Confidant application.

use thiserror::Error;

/// Coarse classification of an [`ConfidantError`].
///
/// Front ends use the kind to decide how to phrase a status line; the
/// variant carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Storage,
    Generation,
    Config,
    Internal,
}

/// A shared error type for the entire Confidant application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone)]
pub enum ConfidantError {
    /// A required identifier or file name was empty or missing
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found error with type information
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Writing or reading a persisted file failed
    #[error("Storage error at {path}: {message}")]
    Storage { path: String, message: String },

    /// The per-user directory layout could not be created.
    ///
    /// Treated as fatal: the environment cannot hold any persisted state.
    #[error("Cannot create directory {path}: {message}")]
    Layout { path: String, message: String },

    /// The external text-generation call failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConfidantError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Storage error for the given path
    pub fn storage(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Storage {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a Layout error for the given directory
    pub fn layout(path: impl AsRef<std::path::Path>, message: impl ToString) -> Self {
        Self::Layout {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }

    /// Creates a Generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Returns the coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage { .. } | Self::Layout { .. } => ErrorKind::Storage,
            Self::Generation(_) => ErrorKind::Generation,
            Self::Config(_) => ErrorKind::Config,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an InvalidArgument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this is a Generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation(_))
    }

    /// Whether the interactive loop must stop after this error.
    ///
    /// Only a failure to create the user's directory layout is fatal; every
    /// other error is reported and the loop continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Layout { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ConfidantError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            path: String::new(),
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ConfidantError {
    fn from(err: serde_json::Error) -> Self {
        Self::Generation(format!("invalid JSON payload: {err}"))
    }
}

impl From<toml::de::Error> for ConfidantError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A type alias for `Result<T, ConfidantError>`.
pub type Result<T> = std::result::Result<T, ConfidantError>;
