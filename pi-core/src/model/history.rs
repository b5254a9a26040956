//! src/model/history.rs
//!
//! Navigation history: the single-step previous directory used by the
//! keyboard UI, a bounded most-recently-used list used by the line UI and the
//! history picker, and the persisted history file behind it.

use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct NavigationHistory {
    previous: Option<PathBuf>,
    /// Most recent first, no duplicates.
    mru: VecDeque<PathBuf>,
    max: usize,
}

impl NavigationHistory {
    pub fn new(max: usize) -> Self {
        Self {
            previous: None,
            mru: VecDeque::new(),
            max: max.max(1),
        }
    }

    /// Seed the MRU list, most recent first.
    pub fn seed<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) {
        for path in paths {
            if self.mru.len() >= self.max {
                break;
            }
            if !self.mru.contains(&path) {
                self.mru.push_back(path);
            }
        }
    }

    /// Record a move from `from` to `to`. Moving to the same directory
    /// leaves the previous directory untouched.
    pub fn record(&mut self, from: &Path, to: &Path) {
        if from != to {
            self.previous = Some(from.to_path_buf());
        }
        self.visit(to);
    }

    /// Put `path` at the front of the MRU list.
    pub fn visit(&mut self, path: &Path) {
        self.mru.retain(|p: &PathBuf| p != path);
        self.mru.push_front(path.to_path_buf());
        self.mru.truncate(self.max);
    }

    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    /// Most recent MRU entry that is not `current`.
    pub fn mru_back(&self, current: &Path) -> Option<&Path> {
        self.mru
            .iter()
            .map(PathBuf::as_path)
            .find(|p: &&Path| *p != current)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Path> {
        self.mru.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.mru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mru.is_empty()
    }
}

/// History file: one absolute path per line, most recent first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max: usize,
}

impl HistoryStore {
    /// Open the store, creating the parent directory.
    pub fn open(path: PathBuf, max: usize) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::file_operation_failed("create history directory", parent, e.to_string())
            })?;
        }
        Ok(Self {
            path,
            max: max.max(1),
        })
    }

    pub fn load(&self) -> Result<Vec<PathBuf>, AppError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|line: &&str| !line.is_empty())
                .map(PathBuf::from)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::file_operation_failed(
                "read history",
                &self.path,
                e.to_string(),
            )),
        }
    }

    /// Move `path` to the front, dropping duplicates and the overflow.
    pub fn add(&self, path: &Path) -> Result<(), AppError> {
        let mut entries: Vec<PathBuf> = self.load()?;
        entries.retain(|p: &PathBuf| p != path);
        entries.insert(0, path.to_path_buf());
        entries.truncate(self.max);

        let text: String = entries
            .iter()
            .map(|p: &PathBuf| p.to_string_lossy())
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&self.path, text).map_err(|e| {
            AppError::file_operation_failed("write history", &self.path, e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_ignores_self_navigation() {
        let mut history = NavigationHistory::new(10);
        history.record(Path::new("/a"), Path::new("/b"));
        assert_eq!(history.previous(), Some(Path::new("/a")));

        history.record(Path::new("/b"), Path::new("/b"));
        assert_eq!(history.previous(), Some(Path::new("/a")));
    }

    #[test]
    fn test_mru_back_skips_current() {
        let mut history = NavigationHistory::new(10);
        history.visit(Path::new("/a"));
        history.visit(Path::new("/b"));
        history.visit(Path::new("/a"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.mru_back(Path::new("/a")), Some(Path::new("/b")));
        assert_eq!(history.mru_back(Path::new("/b")), Some(Path::new("/a")));

        let lonely = NavigationHistory::new(10);
        assert_eq!(lonely.mru_back(Path::new("/a")), None);
    }

    #[test]
    fn test_mru_is_bounded() {
        let mut history = NavigationHistory::new(3);
        for i in 0..5 {
            history.visit(&PathBuf::from(format!("/d{i}")));
        }
        let entries: Vec<&Path> = history.entries().collect();
        assert_eq!(entries, [Path::new("/d4"), Path::new("/d3"), Path::new("/d2")]);
    }

    #[test]
    fn test_store_is_mru_first_deduplicated_and_capped() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("cfg/history");
        let store = HistoryStore::open(file.clone(), 3).unwrap();
        assert!(store.load().unwrap().is_empty());

        for dir in ["/a", "/b", "/c", "/a", "/d"] {
            store.add(Path::new(dir)).unwrap();
        }

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded,
            vec![PathBuf::from("/d"), PathBuf::from("/a"), PathBuf::from("/c")]
        );
        let raw = fs::read_to_string(&file).unwrap();
        assert_eq!(raw, "/d\n/a\n/c");

        fs::remove_file(&file).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_seed_keeps_order_and_bounds() {
        let mut history = NavigationHistory::new(2);
        history.seed(vec![
            PathBuf::from("/x"),
            PathBuf::from("/x"),
            PathBuf::from("/y"),
            PathBuf::from("/z"),
        ]);
        let entries: Vec<&Path> = history.entries().collect();
        assert_eq!(entries, [Path::new("/x"), Path::new("/y")]);
    }
}
