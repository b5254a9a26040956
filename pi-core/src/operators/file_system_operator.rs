//! src/operators/file_system_operator.rs
//! ============================================================================
//! # FileSystemOperator: structural mutations of the current directory
//!
//! Create, delete, rename and toggle execute bits. Each operation runs
//! synchronously and reports failure as an `AppError`; the caller refreshes
//! the listing afterwards.

use std::fs::{self, Metadata, OpenOptions};
use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemOperation {
    CreateFile { path: PathBuf },

    CreateDirectory { path: PathBuf },

    Delete { path: PathBuf },

    Rename { source: PathBuf, new_name: String },

    /// Flip the owner, group and other execute bits.
    ToggleExecutable { path: PathBuf },
}

impl FileSystemOperation {
    /// Get operation name for logging and status messages
    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::CreateFile { .. } => "touch",
            Self::CreateDirectory { .. } => "mkdir",
            Self::Delete { .. } => "rm",
            Self::Rename { .. } => "mv",
            Self::ToggleExecutable { .. } => "chmod",
        }
    }

    pub fn target_path(&self) -> &Path {
        match self {
            Self::CreateFile { path }
            | Self::CreateDirectory { path }
            | Self::Delete { path }
            | Self::ToggleExecutable { path } => path,
            Self::Rename { source, .. } => source,
        }
    }

    /// Run the operation. Returns the path that exists afterwards (the new
    /// name for a rename), or the removed path for a delete.
    #[instrument(level = "debug", skip(self), fields(operation = self.operation_name()))]
    pub fn execute(&self) -> Result<PathBuf, AppError> {
        let result: Result<PathBuf, AppError> = match self {
            Self::CreateFile { path } => create_file(path),
            Self::CreateDirectory { path } => create_directory(path),
            Self::Delete { path } => delete_path(path),
            Self::Rename { source, new_name } => rename_path(source, new_name),
            Self::ToggleExecutable { path } => toggle_executable(path),
        };

        match &result {
            Ok(path) => info!(
                marker = "FS_OPERATION_COMPLETE",
                operation_type = self.operation_name(),
                path = %path.display(),
                "Filesystem operation completed"
            ),
            Err(e) => warn!(
                marker = "FS_OPERATION_FAILED",
                operation_type = self.operation_name(),
                path = %self.target_path().display(),
                error = %e,
                "Filesystem operation failed"
            ),
        }

        result
    }
}

/// Validate a single new entry name typed by the user.
pub fn validate_name(name: &str) -> Result<&str, AppError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("name", "must not be empty"));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::invalid_input("name", format!("'{trimmed}' is reserved")));
    }
    if trimmed.contains('/') {
        return Err(AppError::invalid_input("name", "must not contain '/'"));
    }
    Ok(trimmed)
}

fn failed(operation: &str, path: &Path, e: &std::io::Error) -> AppError {
    let reason: String = match e.kind() {
        ErrorKind::AlreadyExists => "already exists".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => e.to_string(),
    };
    AppError::file_operation_failed(operation, path, reason)
}

fn create_file(path: &Path) -> Result<PathBuf, AppError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| failed("touch", path, &e))?;
    Ok(path.to_path_buf())
}

fn create_directory(path: &Path) -> Result<PathBuf, AppError> {
    fs::create_dir(path).map_err(|e| failed("mkdir", path, &e))?;
    Ok(path.to_path_buf())
}

/// Directories are removed recursively; symlinks are removed, never followed.
fn delete_path(path: &Path) -> Result<PathBuf, AppError> {
    let meta: Metadata = fs::symlink_metadata(path).map_err(|e| failed("rm", path, &e))?;
    if meta.is_dir() {
        fs::remove_dir_all(path).map_err(|e| failed("rm", path, &e))?;
    } else {
        fs::remove_file(path).map_err(|e| failed("rm", path, &e))?;
    }
    Ok(path.to_path_buf())
}

fn rename_path(source: &Path, new_name: &str) -> Result<PathBuf, AppError> {
    let new_name: &str = validate_name(new_name)?;
    let parent: &Path = source
        .parent()
        .ok_or_else(|| AppError::file_operation_failed("mv", source, "has no parent"))?;
    let dest: PathBuf = parent.join(new_name);

    if dest == source {
        return Ok(dest);
    }
    // rename(2) silently replaces files.
    if fs::symlink_metadata(&dest).is_ok() {
        return Err(AppError::file_operation_failed(
            "mv",
            &dest,
            "already exists",
        ));
    }

    fs::rename(source, &dest).map_err(|e| failed("mv", source, &e))?;
    Ok(dest)
}

fn toggle_executable(path: &Path) -> Result<PathBuf, AppError> {
    let meta: Metadata = fs::metadata(path).map_err(|e| failed("chmod", path, &e))?;
    let mode: u32 = meta.permissions().mode() & 0o7777;
    let new_mode: u32 = mode ^ 0o111;

    fs::set_permissions(path, fs::Permissions::from_mode(new_mode))
        .map_err(|e| failed("chmod", path, &e))?;
    Ok(path.to_path_buf())
}
