//! Per-item clipboard errors.
//!
//! Every variant is cheap to clone so a paste report can be handed to the UI
//! without keeping `io::Error` values alive.

use compact_str::CompactString;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

pub type ClipResult<T> = Result<T, ClipError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipError {
    #[error("{path} already exists")]
    AlreadyExists { path: CompactString },

    #[error("Invalid file path: {0}")]
    InvalidPath(CompactString),

    #[error("Source no longer exists: {path}")]
    SourceMissing { path: CompactString },

    #[error("Cannot paste {source_path} into itself ({dest})")]
    RecursiveCopy {
        source_path: CompactString,
        dest: CompactString,
    },

    #[error("{path}: {message}")]
    Io {
        path: CompactString,
        kind: ErrorKind,
        message: String,
    },
}

impl ClipError {
    /// Wrap an I/O error together with the path it happened on.
    #[inline]
    pub fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: CompactString::from(path.to_string_lossy()),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    #[inline]
    pub fn already_exists(path: &Path) -> Self {
        Self::AlreadyExists {
            path: CompactString::from(path.to_string_lossy()),
        }
    }

    #[inline]
    pub fn source_missing(path: &Path) -> Self {
        Self::SourceMissing {
            path: CompactString::from(path.to_string_lossy()),
        }
    }

    #[inline]
    pub fn invalid_path(path: &Path) -> Self {
        Self::InvalidPath(CompactString::from(path.to_string_lossy()))
    }

    #[inline]
    pub fn recursive_copy(source: &Path, dest: &Path) -> Self {
        Self::RecursiveCopy {
            source_path: CompactString::from(source.to_string_lossy()),
            dest: CompactString::from(dest.to_string_lossy()),
        }
    }

    /// True when retrying under a different destination name could succeed.
    #[inline]
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
