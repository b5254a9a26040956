//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the pi Engine
//!
//! Every fallible engine operation returns `Result<T, AppError>`. Mutation
//! errors are caught at the dispatch boundary and turned into transient
//! status messages; only startup failures reach `main`.

use pi_clip::ClipError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all engine operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Requested file or directory does not exist.
    #[error("File or directory not found: {0:?}")]
    NotFound(PathBuf),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File operation specific errors
    #[error("{operation} failed on {path:?}: {reason}")]
    FileOperationFailed {
        operation: String, // "create", "delete", "rename", etc.
        path: PathBuf,
        reason: String,
    },

    /// Directory navigation errors
    #[error("Cannot enter {path:?}: {reason}")]
    NavigationFailed { path: PathBuf, reason: String },

    /// Input validation errors
    #[error("Invalid {field}: {message}")]
    InvalidInput {
        field: String, // "filename", "mark", etc.
        message: String,
    },

    /// External process/command failure (editor, opener, shell, ...).
    #[error("External command failed: {cmd} (exit code: {code:?})")]
    ExternalCmd { cmd: String, code: Option<i32> },

    /// Single-instance socket errors.
    #[error("Instance channel error: {0}")]
    Ipc(String),

    /// A feature whose backing store could not be opened at startup.
    #[error("{0} unavailable")]
    Unavailable(&'static str),

    /// Paste or link failure coming from the clipboard crate.
    #[error(transparent)]
    Clipboard(#[from] ClipError),

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl AppError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create a file operation failure error
    pub fn file_operation_failed<S1, P, S2>(operation: S1, path: P, reason: S2) -> Self
    where
        S1: Into<String>,
        P: Into<PathBuf>,
        S2: Into<String>,
    {
        Self::FileOperationFailed {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a navigation failure error
    pub fn navigation_failed<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::NavigationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn ipc<S: Into<String>>(message: S) -> Self {
        Self::Ipc(message.into())
    }
}
