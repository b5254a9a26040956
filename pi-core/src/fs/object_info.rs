//! `src/fs/object_info.rs`
//! ============================================================
//! One listed filesystem object and its classification.
//!
//! Entries are derived, never stored: the lister rebuilds them on every
//! refresh. Classification order is symlink first (active or broken by
//! target existence), then directory, then the execute bits, else a plain
//! file.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

// ------------------------------------------------------------
// EntryKind — the four kinds an entry can classify as.
// ------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    SymlinkActive,
    SymlinkBroken,
}

impl EntryKind {
    #[inline]
    pub const fn is_symlink(self) -> bool {
        matches!(self, Self::SymlinkActive | Self::SymlinkBroken)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &str = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::SymlinkActive => "symlink",
            Self::SymlinkBroken => "broken symlink",
        };
        write!(f, "{s}")
    }
}

// ------------------------------------------------------------
// Entry
// ------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: CompactString,

    /// Absolute path; the identity used by the selection.
    pub path: PathBuf,

    pub kind: EntryKind,

    /// Any execute bit set on a regular, non-symlink file.
    pub executable: bool,

    /// Resolves to a directory, following an active symlink.
    pub is_dir: bool,
}

impl Entry {
    /// Classify `path` without following it first.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta: Metadata = fs::symlink_metadata(path)?;
        let name = CompactString::from(
            path.file_name()
                .map(OsStr::to_string_lossy)
                .unwrap_or_default(),
        );

        let (kind, is_dir, executable): (EntryKind, bool, bool) = if meta.file_type().is_symlink()
        {
            match fs::metadata(path) {
                Ok(target) => (EntryKind::SymlinkActive, target.is_dir(), false),
                Err(_) => (EntryKind::SymlinkBroken, false, false),
            }
        } else if meta.is_dir() {
            (EntryKind::Directory, true, false)
        } else {
            let executable: bool = meta.permissions().mode() & 0o111 != 0;
            (EntryKind::File, false, executable)
        };

        Ok(Self {
            name,
            path: path.to_path_buf(),
            kind,
            executable,
            is_dir,
        })
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Suffix shown after the name: `@` symlink, `!` broken link, `/`
    /// directory, `*` executable.
    pub const fn indicator(&self) -> &'static str {
        match self.kind {
            EntryKind::SymlinkActive => "@",
            EntryKind::SymlinkBroken => "!",
            EntryKind::Directory => "/",
            EntryKind::File if self.executable => "*",
            EntryKind::File => "",
        }
    }

    /// Directories first, then case-insensitive name.
    pub fn listing_order(a: &Self, b: &Self) -> Ordering {
        (!a.is_dir)
            .cmp(&!b.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    }
}
