use crate::error::{ClipError, ClipResult};
use compact_str::CompactString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub source_path: PathBuf,
    pub name: CompactString,
}

impl ClipboardItem {
    pub fn new(path: PathBuf) -> ClipResult<Self> {
        let name: CompactString = path
            .file_name()
            .map(|name| CompactString::from(name.to_string_lossy()))
            .ok_or_else(|| ClipError::invalid_path(&path))?;

        Ok(Self {
            source_path: path,
            name,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    /// Destination of this item when pasted or linked into `dest_dir`.
    pub fn destination_in(&self, dest_dir: &Path) -> PathBuf {
        dest_dir.join(self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardOperation {
    #[default]
    Copy,
    Move,
}

impl ClipboardOperation {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Copy => "cp",
            Self::Move => "cut",
        }
    }
}
