use crate::error::ClipError;
use crate::item::{ClipboardItem, ClipboardOperation};
use crate::operations::FileOperation;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Captured source paths plus the copy/cut mode they were yanked with.
///
/// Always present; an empty clipboard makes paste and link no-ops.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<ClipboardItem>,
    operation: ClipboardOperation,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard contents with `paths`.
    ///
    /// Duplicate paths collapse into one item; paths without a file name
    /// (such as `/`) are skipped. Returns the number of items captured.
    pub fn yank<I>(&mut self, paths: I, operation: ClipboardOperation) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.items.clear();
        self.operation = operation;

        for path in paths {
            if self.items.iter().any(|item| item.source_path == path) {
                continue;
            }
            match ClipboardItem::new(path) {
                Ok(item) => self.items.push(item),
                Err(e) => warn!(
                    marker = "CLIPBOARD_YANK_SKIPPED",
                    operation_type = "clipboard_yank",
                    error = %e,
                    "Skipping path without a file name"
                ),
            }
        }

        info!(
            marker = "CLIPBOARD_YANK",
            operation_type = "clipboard_yank",
            mode = operation.tag(),
            entries_count = self.items.len(),
            "Clipboard replaced"
        );
        self.items.len()
    }

    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(|item| item.source_path.as_path())
    }

    pub fn operation(&self) -> ClipboardOperation {
        self.operation
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Paste every item into `dest_dir`.
    ///
    /// Copy mode leaves the clipboard untouched so the paste can be repeated;
    /// cut mode empties it whatever the individual outcomes were.
    pub fn paste(&mut self, dest_dir: &Path) -> PasteReport {
        let mut report = PasteReport::new(self.operation.tag());

        for item in &self.items {
            let dest: PathBuf = item.destination_in(dest_dir);
            let op: FileOperation = match self.operation {
                ClipboardOperation::Copy => FileOperation::Copy {
                    source: item.source_path.clone(),
                    dest,
                },
                ClipboardOperation::Move => FileOperation::Move {
                    source: item.source_path.clone(),
                    dest,
                },
            };
            report.record(&item.source_path, op.execute());
        }

        if self.operation == ClipboardOperation::Move {
            self.items.clear();
        }

        report.log(dest_dir);
        report
    }

    /// Create a relative symlink in `dest_dir` for every item.
    ///
    /// Names that already exist in `dest_dir` are reported, never replaced.
    pub fn link(&self, dest_dir: &Path) -> PasteReport {
        let mut report = PasteReport::new("link");

        for item in &self.items {
            let op = FileOperation::Link {
                source: item.source_path.clone(),
                dest: item.destination_in(dest_dir),
            };
            report.record(&item.source_path, op.execute());
        }

        report.log(dest_dir);
        report
    }
}

/// Outcome of a paste or link batch, one entry per clipboard item.
#[derive(Debug, Clone, Default)]
pub struct PasteReport {
    pub operation: &'static str,
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ClipError)>,
}

impl PasteReport {
    fn new(operation: &'static str) -> Self {
        Self {
            operation,
            ..Self::default()
        }
    }

    fn record(&mut self, source: &Path, result: Result<(), ClipError>) {
        match result {
            Ok(()) => self.succeeded.push(source.to_path_buf()),
            Err(e) => self.failed.push((source.to_path_buf(), e)),
        }
    }

    fn log(&self, dest_dir: &Path) {
        for (source, error) in &self.failed {
            warn!(
                marker = "CLIPBOARD_ITEM_FAILED",
                operation_type = self.operation,
                source = %source.display(),
                dest_dir = %dest_dir.display(),
                error = %error,
                "Clipboard item failed"
            );
        }
        info!(
            marker = "CLIPBOARD_BATCH_COMPLETE",
            operation_type = self.operation,
            dest_dir = %dest_dir.display(),
            succeeded = self.succeeded.len(),
            failed = self.failed.len(),
            "Clipboard batch finished"
        );
    }

    /// Nothing was attempted (empty clipboard).
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// One-line summary for the status line.
    pub fn summary(&self) -> String {
        let mut summary = format!("{}: {} done", self.operation, self.succeeded.len());
        if let Some((_, first)) = self.failed.first() {
            summary.push_str(&format!(", {} failed ({first})", self.failed.len()));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("tree/inner")).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("a.txt"), b"alpha").unwrap();
        fs::write(src.join("tree/inner/b.txt"), b"beta").unwrap();
        (tmp, src, dst)
    }

    #[test]
    fn test_copy_paste_keeps_sources_and_clipboard() {
        let (_tmp, src, dst) = setup();
        let mut clip = Clipboard::new();
        clip.yank(
            vec![src.join("a.txt"), src.join("tree")],
            ClipboardOperation::Copy,
        );

        let report = clip.paste(&dst);

        assert!(!report.has_failures(), "{:?}", report.failed);
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"alpha");
        assert_eq!(fs::read(dst.join("tree/inner/b.txt")).unwrap(), b"beta");
        assert!(src.join("a.txt").exists());
        assert!(src.join("tree/inner/b.txt").exists());
        assert_eq!(clip.len(), 2);
    }

    #[test]
    fn test_cut_paste_moves_and_empties_clipboard() {
        let (_tmp, src, dst) = setup();
        let mut clip = Clipboard::new();
        clip.yank(vec![src.join("a.txt")], ClipboardOperation::Move);

        let report = clip.paste(&dst);

        assert_eq!(report.succeeded.len(), 1);
        assert!(!src.join("a.txt").exists());
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"alpha");
        assert!(clip.is_empty());

        let second = clip.paste(&dst);
        assert!(second.is_empty());
    }

    #[test]
    fn test_paste_failure_does_not_abort_batch() {
        let (_tmp, src, dst) = setup();
        fs::write(dst.join("a.txt"), b"occupied").unwrap();

        let mut clip = Clipboard::new();
        clip.yank(
            vec![src.join("a.txt"), src.join("missing"), src.join("tree")],
            ClipboardOperation::Copy,
        );
        let report = clip.paste(&dst);

        assert_eq!(report.succeeded, vec![src.join("tree")]);
        assert_eq!(report.failed.len(), 2);
        assert!(report.failed[0].1.is_collision());
        assert!(matches!(report.failed[1].1, ClipError::SourceMissing { .. }));
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"occupied");
        assert!(report.summary().contains("2 failed"));
    }

    #[test]
    fn test_yank_replaces_and_deduplicates() {
        let mut clip = Clipboard::new();
        clip.yank(
            vec![PathBuf::from("/x/a"), PathBuf::from("/x/a"), PathBuf::from("/")],
            ClipboardOperation::Copy,
        );
        assert_eq!(clip.len(), 1);

        clip.yank(vec![PathBuf::from("/y/b")], ClipboardOperation::Move);
        assert_eq!(clip.len(), 1);
        assert_eq!(clip.operation(), ClipboardOperation::Move);
        assert_eq!(clip.items()[0].display_name(), "b");
    }

    #[test]
    fn test_link_skips_existing_names() {
        let (_tmp, src, dst) = setup();
        fs::write(dst.join("a.txt"), b"mine").unwrap();

        let mut clip = Clipboard::new();
        clip.yank(
            vec![src.join("a.txt"), src.join("tree")],
            ClipboardOperation::Copy,
        );
        let report = clip.link(&dst);

        assert_eq!(report.succeeded, vec![src.join("tree")]);
        assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"mine");
        assert!(fs::symlink_metadata(dst.join("tree")).unwrap().file_type().is_symlink());
        assert!(dst.join("tree/inner/b.txt").exists());
        assert_eq!(clip.len(), 2);
    }
}
