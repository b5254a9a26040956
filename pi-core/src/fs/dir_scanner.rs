//! ``src/fs/dir_scanner.rs``
//!
//! # `Directory Scanner`: Synchronous, fail-soft directory listing
//!
//! Reads one directory, applies the hidden-file and name filters and returns
//! the entries in listing order. A directory that cannot be read yields an
//! empty listing.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::fs::object_info::Entry;

/// List `path`.
///
/// # Arguments
/// * `show_hidden` - Include names starting with `.`.
/// * `pattern` - Keep only names containing this substring (case-sensitive).
///   An empty pattern keeps everything.
pub fn list(path: &Path, show_hidden: bool, pattern: Option<&str>) -> Vec<Entry> {
    let start_time: Instant = Instant::now();
    let pattern: Option<&str> = pattern.filter(|p: &&str| !p.is_empty());

    let read_dir: ReadDir = match fs::read_dir(path) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            info!(
                marker = "DIRECTORY_LIST_FAILED",
                operation_type = "list_dir",
                path = %path.display(),
                error = %e,
                "Directory unreadable, showing empty listing"
            );
            return Vec::new();
        }
    };

    let mut entries: Vec<Entry> = Vec::new();

    for dir_entry in read_dir {
        let entry_path: PathBuf = match dir_entry {
            Ok(dir_entry) => dir_entry.path(),
            Err(e) => {
                debug!(
                    marker = "DIRECTORY_ENTRY_SKIPPED",
                    operation_type = "list_dir",
                    error = %e,
                    "Skipping unreadable directory entry"
                );
                continue;
            }
        };

        match Entry::from_path(&entry_path) {
            Ok(entry) => {
                if !show_hidden && entry.is_hidden() {
                    continue;
                }
                if let Some(pattern) = pattern
                    && !entry.name.contains(pattern)
                {
                    continue;
                }
                entries.push(entry);
            }

            Err(e) => {
                // Vanished between readdir and stat; the rest of the listing survives.
                debug!(
                    marker = "DIRECTORY_ENTRY_SKIPPED",
                    operation_type = "list_dir",
                    path = %entry_path.display(),
                    error = %e,
                    "Failed to classify entry"
                );
            }
        }
    }

    sort_entries(&mut entries);

    debug!(
        marker = "DIRECTORY_LIST",
        operation_type = "list_dir",
        path = %path.display(),
        entries_count = entries.len(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Directory listed"
    );

    entries
}

/// Stable sort into listing order; ties keep the OS order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(Entry::listing_order);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::object_info::EntryKind;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn scenario_dir() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("a.txt"), b"a").unwrap();
        fs::write(dir.join(".hidden"), b"h").unwrap();
        fs::create_dir(dir.join("sub")).unwrap();
        symlink(dir.join("a.txt"), dir.join("link")).unwrap();
        symlink(dir.join("missing"), dir.join("broken")).unwrap();
        tmp
    }

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_scenario_listing_order_and_kinds() {
        let tmp = scenario_dir();
        let entries = list(tmp.path(), false, None);

        assert_eq!(names(&entries), ["sub", "a.txt", "broken", "link"]);
        assert_eq!(entries[2].kind, EntryKind::SymlinkBroken);
        assert_eq!(entries[3].kind, EntryKind::SymlinkActive);
    }

    #[test]
    fn test_hidden_filter_and_superset() {
        let tmp = scenario_dir();
        let visible = list(tmp.path(), false, None);
        let all = list(tmp.path(), true, None);

        assert!(visible.iter().all(|e| !e.name.starts_with('.')));
        assert!(visible.iter().all(|e| all.contains(e)));
        assert_eq!(all.len(), visible.len() + 1);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let tmp = scenario_dir();
        let mut entries = list(tmp.path(), true, None);
        let before = entries.clone();
        sort_entries(&mut entries);
        assert_eq!(entries, before);

        for pair in entries.windows(2) {
            assert_ne!(
                Entry::listing_order(&pair[0], &pair[1]),
                std::cmp::Ordering::Greater
            );
        }
    }

    #[test]
    fn test_pattern_is_case_sensitive_substring() {
        let tmp = scenario_dir();
        fs::write(tmp.path().join("README"), b"r").unwrap();

        assert_eq!(names(&list(tmp.path(), false, Some("in"))), ["link"]);
        assert_eq!(names(&list(tmp.path(), false, Some("READ"))), ["README"]);
        assert!(list(tmp.path(), false, Some("read")).is_empty());
        assert_eq!(list(tmp.path(), false, Some("")).len(), 5);
    }

    #[test]
    fn test_unreadable_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list(&tmp.path().join("nope"), true, None).is_empty());
    }
}
