//! Filesystem side of paste and link.
//!
//! Each [`FileOperation`] acts on exactly one clipboard item and never
//! overwrites an existing destination. Copied symlinks stay symlinks; a
//! relative target that points outside the copied item is rewritten so the
//! copy resolves to the same place as the original.

use crate::error::{ClipError, ClipResult};
use filetime::FileTime;
use std::fs::{self, Metadata, Permissions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Copy { source: PathBuf, dest: PathBuf },
    Move { source: PathBuf, dest: PathBuf },
    Link { source: PathBuf, dest: PathBuf },
}

impl FileOperation {
    pub fn source_path(&self) -> &Path {
        match self {
            Self::Copy { source, .. } | Self::Move { source, .. } | Self::Link { source, .. } => {
                source
            }
        }
    }

    pub fn dest_path(&self) -> &Path {
        match self {
            Self::Copy { dest, .. } | Self::Move { dest, .. } | Self::Link { dest, .. } => dest,
        }
    }

    pub fn operation_name(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "copy",
            Self::Move { .. } => "move",
            Self::Link { .. } => "link",
        }
    }

    pub fn execute(&self) -> ClipResult<()> {
        debug!(
            marker = "CLIPBOARD_ITEM_START",
            operation_type = self.operation_name(),
            source = %self.source_path().display(),
            dest = %self.dest_path().display(),
            "Executing clipboard item"
        );

        match self {
            Self::Copy { source, dest } => copy_path(source, dest),
            Self::Move { source, dest } => move_path(source, dest),
            Self::Link { source, dest } => link_path(source, dest),
        }
    }
}

fn ensure_vacant(dest: &Path) -> ClipResult<()> {
    // symlink_metadata so that a broken link at the destination still counts
    if fs::symlink_metadata(dest).is_ok() {
        return Err(ClipError::already_exists(dest));
    }
    Ok(())
}

fn source_metadata(source: &Path) -> ClipResult<Metadata> {
    fs::symlink_metadata(source).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ClipError::source_missing(source)
        } else {
            ClipError::io(source, &e)
        }
    })
}

fn ensure_not_nested(source: &Path, dest: &Path, meta: &Metadata) -> ClipResult<()> {
    if meta.is_dir() && dest.starts_with(source) {
        return Err(ClipError::recursive_copy(source, dest));
    }
    Ok(())
}

/// Copy a file, directory tree or symlink to `dest`.
pub(crate) fn copy_path(source: &Path, dest: &Path) -> ClipResult<()> {
    let meta: Metadata = source_metadata(source)?;
    ensure_vacant(dest)?;
    ensure_not_nested(source, dest, &meta)?;

    let ftype = meta.file_type();
    if ftype.is_symlink() {
        copy_symlink(source, dest, None)
    } else if ftype.is_dir() {
        copy_tree(source, dest, &meta)
    } else {
        copy_file(source, dest, &meta)
    }
}

fn copy_file(source: &Path, dest: &Path, meta: &Metadata) -> ClipResult<()> {
    // fs::copy carries the permission bits over
    fs::copy(source, dest).map_err(|e| ClipError::io(source, &e))?;

    let atime: FileTime = FileTime::from_last_access_time(meta);
    let mtime: FileTime = FileTime::from_last_modification_time(meta);
    if let Err(e) = filetime::set_file_times(dest, atime, mtime) {
        warn!(
            marker = "CLIPBOARD_TIMES_NOT_PRESERVED",
            operation_type = "copy",
            dest = %dest.display(),
            error = %e,
            "Copied file but could not preserve timestamps"
        );
    }
    Ok(())
}

/// Recreate the link `source` at `dest`. Targets that stay inside `tree`
/// are kept verbatim since the tree moves with them.
#[cfg(unix)]
fn copy_symlink(source: &Path, dest: &Path, tree: Option<&Path>) -> ClipResult<()> {
    let target: PathBuf = fs::read_link(source).map_err(|e| ClipError::io(source, &e))?;
    create_symlink(&rebase_link(source, dest, &target, tree), dest)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, dest: &Path, _tree: Option<&Path>) -> ClipResult<()> {
    let meta: Metadata = fs::metadata(source).map_err(|e| ClipError::io(source, &e))?;
    copy_file(source, dest, &meta)
}

fn rebase_link(link: &Path, dest: &Path, target: &Path, tree: Option<&Path>) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    let (Some(from), Some(to)) = (link.parent(), dest.parent()) else {
        return target.to_path_buf();
    };
    let resolved: PathBuf = lexical_join(from, target);
    if tree.is_some_and(|root: &Path| resolved.starts_with(root)) {
        return target.to_path_buf();
    }
    relative_path(to, &resolved)
}

/// `base` joined with `relative`, with `.` and `..` folded away.
fn lexical_join(base: &Path, relative: &Path) -> PathBuf {
    let mut joined: PathBuf = base.to_path_buf();
    for part in relative.components() {
        match part {
            Component::CurDir => {}
            Component::ParentDir => {
                joined.pop();
            }
            other => joined.push(other.as_os_str()),
        }
    }
    joined
}

/// Copy a directory tree. A failed copy removes what it created.
fn copy_tree(source: &Path, dest: &Path, meta: &Metadata) -> ClipResult<()> {
    fs::create_dir(dest).map_err(|e| ClipError::io(dest, &e))?;

    let result: ClipResult<()> = copy_tree_entries(source, dest, meta.permissions());
    if result.is_err()
        && let Err(e) = fs::remove_dir_all(dest)
    {
        warn!(
            marker = "CLIPBOARD_PARTIAL_COPY_LEFT",
            operation_type = "copy",
            dest = %dest.display(),
            error = %e,
            "Could not remove partially copied tree"
        );
    }
    result
}

fn copy_tree_entries(source: &Path, dest: &Path, root_mode: Permissions) -> ClipResult<()> {
    // directory modes are applied last, deepest first, so that read-only
    // directories still accept their contents
    let mut dir_modes: Vec<(PathBuf, Permissions)> = vec![(dest.to_path_buf(), root_mode)];

    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| walk_error(e, source))?;

        let relative: &Path = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| ClipError::invalid_path(entry.path()))?;
        let target: PathBuf = dest.join(relative);
        let ftype = entry.file_type();

        if ftype.is_symlink() {
            copy_symlink(entry.path(), &target, Some(source))?;
        } else if ftype.is_dir() {
            let meta: Metadata = entry.metadata().map_err(|e| walk_error(e, entry.path()))?;
            fs::create_dir(&target).map_err(|e| ClipError::io(&target, &e))?;
            dir_modes.push((target, meta.permissions()));
        } else {
            let meta: Metadata = entry.metadata().map_err(|e| walk_error(e, entry.path()))?;
            copy_file(entry.path(), &target, &meta)?;
        }
    }

    for (dir, permissions) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(|e| ClipError::io(&dir, &e))?;
    }
    Ok(())
}

fn walk_error(err: walkdir::Error, fallback: &Path) -> ClipError {
    let path: PathBuf = err.path().map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    match err.into_io_error() {
        Some(io) => ClipError::io(&path, &io),
        // only loop detection produces a non-io error, and links are not followed
        None => ClipError::invalid_path(&path),
    }
}

fn remove_path(path: &Path) -> ClipResult<()> {
    let meta: Metadata = source_metadata(path)?;
    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| ClipError::io(path, &e))
}

/// Rename `source` to `dest`, falling back to copy + delete across devices.
pub(crate) fn move_path(source: &Path, dest: &Path) -> ClipResult<()> {
    let meta: Metadata = source_metadata(source)?;
    ensure_vacant(dest)?;
    ensure_not_nested(source, dest, &meta)?;

    if meta.file_type().is_symlink() {
        copy_symlink(source, dest, None)?;
        return remove_path(source);
    }

    match fs::rename(source, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(
                marker = "CLIPBOARD_MOVE_CROSS_DEVICE",
                operation_type = "move",
                source = %source.display(),
                dest = %dest.display(),
                "Rename crossed devices, copying then deleting"
            );
            copy_path(source, dest)?;
            remove_path(source)
        }
        Err(e) => Err(ClipError::io(source, &e)),
    }
}

/// Create a relative symlink at `dest` pointing to `source`.
pub(crate) fn link_path(source: &Path, dest: &Path) -> ClipResult<()> {
    ensure_vacant(dest)?;
    let parent: &Path = dest.parent().ok_or_else(|| ClipError::invalid_path(dest))?;
    let target: PathBuf = relative_path(parent, source);
    create_symlink(&target, dest)
}

#[cfg(unix)]
fn create_symlink(target: &Path, dest: &Path) -> ClipResult<()> {
    std::os::unix::fs::symlink(target, dest).map_err(|e| ClipError::io(dest, &e))
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, dest: &Path) -> ClipResult<()> {
    Err(ClipError::Io {
        path: compact_str::CompactString::from(dest.to_string_lossy()),
        kind: ErrorKind::Unsupported,
        message: "symlinks are not supported on this platform".to_string(),
    })
}

/// Path of `target` as seen from directory `base`.
///
/// Both paths are expected to be absolute; the result climbs out of `base`
/// with `..` until the common prefix and then descends into `target`.
pub fn relative_path(base: &Path, target: &Path) -> PathBuf {
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let common: usize = base_parts
        .iter()
        .zip(target_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}
