//! ``src/model/fs_state.rs``
//! ============================================================================
//! # `PaneState`: listing, cursor and selection of the current directory
//!
//! The pane owns the only copy of the listing. Every refresh re-reads the
//! directory, re-clamps the cursor and drops selected paths that vanished.
//! Directory changes reset the cursor and clear the selection.
//!
//! The keyboard view shows a `..` row above the first entry. It is not part
//! of the listing: while the cursor rests there `current_entry` is `None`,
//! so it never reaches target sets, numeric jumps or find.

use std::collections::BTreeSet;
use std::path::PathBuf;

use compact_str::CompactString;

use crate::fs::{dir_scanner, object_info::Entry};

/// Search direction for find next/previous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone)]
pub struct PaneState {
    /// The directory being listed.
    pub cwd: PathBuf,

    /// Snapshot of the directory as of the last refresh.
    pub entries: Vec<Entry>,

    /// Index into `entries`; 0 when the listing is empty.
    pub cursor: usize,

    /// Cursor rests on the `..` row instead of `entries[cursor]`.
    pub parent_row: bool,

    /// Explicitly toggled entries, by absolute path.
    pub selection: BTreeSet<PathBuf>,

    pub show_hidden: bool,

    /// Case-sensitive substring filter applied while listing.
    pub filter: Option<CompactString>,

    /// Lower-cased pattern reused by find next/previous.
    pub last_search: Option<CompactString>,

    /// Number of visible rows, used for paging.
    pub viewport_height: usize,
}

impl PaneState {
    #[must_use]
    pub fn new(cwd: PathBuf, show_hidden: bool) -> Self {
        let mut pane = Self {
            cwd,
            entries: Vec::new(),
            cursor: 0,
            parent_row: false,
            selection: BTreeSet::new(),
            show_hidden,
            filter: None,
            last_search: None,
            viewport_height: 20,
        };
        pane.refresh();
        pane
    }

    /// Re-list the directory from disk.
    pub fn refresh(&mut self) {
        self.entries = dir_scanner::list(&self.cwd, self.show_hidden, self.filter.as_deref());
        self.clamp_cursor();
        let entries: &[Entry] = &self.entries;
        self.selection
            .retain(|path: &PathBuf| entries.iter().any(|e: &Entry| &e.path == path));
    }

    /// Switch to `dir`: cursor to the top, selection and filter dropped.
    pub fn set_cwd(&mut self, dir: PathBuf) {
        self.cwd = dir;
        self.cursor = 0;
        self.parent_row = false;
        self.selection.clear();
        self.filter = None;
        self.refresh();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.entries.len().saturating_sub(1));
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&Entry> {
        if self.parent_row {
            return None;
        }
        self.entries.get(self.cursor)
    }

    /// `..` is the only row of an empty listing.
    #[must_use]
    pub fn on_parent_row(&self) -> bool {
        self.parent_row || self.entries.is_empty()
    }

    /// Keyboard view row under the cursor, counting `..` as row 0.
    #[must_use]
    pub fn view_row(&self) -> usize {
        if self.on_parent_row() { 0 } else { self.cursor + 1 }
    }

    fn land(&mut self, index: usize) {
        self.parent_row = false;
        self.cursor = index;
        self.clamp_cursor();
    }

    #[must_use]
    pub fn is_selected(&self, entry: &Entry) -> bool {
        self.selection.contains(&entry.path)
    }

    /// Move the cursor by `delta` over the view rows, clamped, without
    /// wraparound. Moving up past the first entry lands on `..`.
    pub fn move_by(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        match self.view_row().checked_add_signed(delta) {
            Some(0) | None => {
                self.cursor = 0;
                self.parent_row = true;
            }
            Some(row) => self.land(row - 1),
        }
    }

    /// Absolute jump, clamped to the listing.
    pub fn jump_to(&mut self, index: usize) {
        self.land(index);
    }

    pub fn select_first(&mut self) {
        self.land(0);
    }

    pub fn select_last(&mut self) {
        self.land(self.entries.len().saturating_sub(1));
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page_size() as isize));
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page_size() as isize);
    }

    fn page_size(&self) -> usize {
        self.viewport_height.max(1)
    }

    /// Put the cursor on `name` if it is listed.
    pub fn select_name(&mut self, name: &str) -> bool {
        match self.index_of_name(name) {
            Some(index) => {
                self.land(index);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e: &Entry| e.name == name)
    }

    /// Toggle the cursor entry; no-op on an empty listing.
    pub fn toggle_current(&mut self) {
        if let Some(path) = self.current_entry().map(|e: &Entry| e.path.clone()) {
            self.toggle_path(path);
        }
    }

    pub fn toggle_index(&mut self, index: usize) -> bool {
        match self.entries.get(index).map(|e: &Entry| e.path.clone()) {
            Some(path) => {
                self.toggle_path(path);
                true
            }
            None => false,
        }
    }

    fn toggle_path(&mut self, path: PathBuf) {
        if !self.selection.remove(&path) {
            self.selection.insert(path);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selection if non-empty, else the cursor entry, else nothing.
    ///
    /// Selected paths come back in listing order.
    #[must_use]
    pub fn target_set(&self) -> Vec<PathBuf> {
        if !self.selection.is_empty() {
            return self
                .entries
                .iter()
                .filter(|e: &&Entry| self.selection.contains(&e.path))
                .map(|e: &Entry| e.path.clone())
                .collect();
        }
        self.current_entry()
            .map(|e: &Entry| vec![e.path.clone()])
            .unwrap_or_default()
    }

    /// Remember `pattern` and find its first match after the cursor.
    pub fn find(&mut self, pattern: &str) -> bool {
        self.last_search = Some(CompactString::new(pattern.to_lowercase()));
        self.find_again(SearchDirection::Forward)
    }

    /// Case-insensitive search starting just past the cursor, wrapping once.
    /// From the `..` row every entry is a candidate. No match leaves the
    /// cursor where it is.
    pub fn find_again(&mut self, direction: SearchDirection) -> bool {
        let Some(pattern) = self.last_search.as_deref() else {
            return false;
        };
        let len: usize = self.entries.len();
        if len == 0 || pattern.is_empty() {
            return false;
        }

        let origin: usize = match (self.parent_row, direction) {
            (false, _) => self.cursor,
            (true, SearchDirection::Forward) => len - 1,
            (true, SearchDirection::Backward) => 0,
        };
        for step in 1..=len {
            let index: usize = match direction {
                SearchDirection::Forward => (origin + step) % len,
                SearchDirection::Backward => (origin + len - step) % len,
            };
            if self.entries[index].name.to_lowercase().contains(pattern) {
                self.land(index);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pane_with(files: &[&str]) -> (TempDir, PaneState) {
        let tmp = TempDir::new().unwrap();
        for name in files {
            fs::write(tmp.path().join(name), name.as_bytes()).unwrap();
        }
        let pane = PaneState::new(tmp.path().to_path_buf(), false);
        (tmp, pane)
    }

    #[test]
    fn test_cursor_stays_in_range_across_moves_and_refreshes() {
        let (tmp, mut pane) = pane_with(&["a", "b", "c", "d"]);

        pane.move_by(10);
        assert_eq!(pane.cursor, 3);
        pane.move_by(-100);
        assert_eq!(pane.cursor, 0);

        pane.select_last();
        fs::remove_file(tmp.path().join("d")).unwrap();
        fs::remove_file(tmp.path().join("c")).unwrap();
        pane.refresh();
        assert_eq!(pane.cursor, 1);

        for name in ["a", "b"] {
            fs::remove_file(tmp.path().join(name)).unwrap();
        }
        pane.refresh();
        assert_eq!(pane.cursor, 0);
        pane.move_by(1);
        assert_eq!(pane.cursor, 0);
        assert!(pane.current_entry().is_none());
    }

    #[test]
    fn test_target_set_falls_back_to_cursor() {
        let (_tmp, mut pane) = pane_with(&["a", "b", "c"]);
        assert_eq!(pane.target_set(), vec![pane.cwd.join("a")]);

        pane.toggle_index(2);
        pane.toggle_index(0);
        assert_eq!(pane.target_set(), vec![pane.cwd.join("a"), pane.cwd.join("c")]);

        pane.toggle_index(0);
        assert_eq!(pane.target_set(), vec![pane.cwd.join("c")]);
    }

    #[test]
    fn test_refresh_drops_vanished_selection() {
        let (tmp, mut pane) = pane_with(&["a", "b"]);
        pane.toggle_index(0);
        pane.toggle_index(1);

        fs::remove_file(tmp.path().join("a")).unwrap();
        pane.refresh();

        assert_eq!(pane.selection.len(), 1);
        assert!(pane.selection.contains(&pane.cwd.join("b")));
    }

    #[test]
    fn test_directory_change_clears_selection_and_cursor() {
        let (tmp, mut pane) = pane_with(&["a", "b"]);
        fs::create_dir(tmp.path().join("sub")).unwrap();
        pane.refresh();
        pane.select_last();
        pane.toggle_current();
        pane.filter = Some("a".into());

        pane.set_cwd(tmp.path().join("sub"));

        assert_eq!(pane.cursor, 0);
        assert!(pane.selection.is_empty());
        assert!(pane.filter.is_none());
    }

    #[test]
    fn test_find_wraps_and_visits_every_match_once() {
        let (_tmp, mut pane) = pane_with(&["apple", "Banana", "cherry", "grape", "pear"]);
        pane.jump_to(2);

        assert!(pane.find("A"));
        let first = pane.cursor;
        let mut visited = vec![first];
        for _ in 0..pane.entries.len() {
            assert!(pane.find_again(SearchDirection::Forward));
            visited.push(pane.cursor);
        }

        let matches: BTreeSet<usize> = pane
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.name.to_lowercase().contains('a'))
            .map(|(i, _)| i)
            .collect();
        let cycle: BTreeSet<usize> = visited[..matches.len()].iter().copied().collect();
        assert_eq!(cycle, matches);
        assert_eq!(visited[matches.len()], first);
    }

    #[test]
    fn test_find_backward_and_no_match() {
        let (_tmp, mut pane) = pane_with(&["a1", "b", "a2", "c"]);
        pane.jump_to(1);
        assert!(pane.find("a"));
        assert_eq!(pane.cursor, 2);
        assert!(pane.find_again(SearchDirection::Backward));
        assert_eq!(pane.cursor, 0);

        assert!(!pane.find("zzz"));
        assert_eq!(pane.cursor, 0);
    }

    #[test]
    fn test_paging_and_select_name() {
        let names: Vec<String> = (0..30).map(|i| format!("f{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let (_tmp, mut pane) = pane_with(&refs);
        pane.viewport_height = 10;

        pane.page_down();
        assert_eq!(pane.cursor, 10);
        pane.page_down();
        pane.page_down();
        assert_eq!(pane.cursor, 29);
        pane.page_up();
        assert_eq!(pane.cursor, 19);

        assert!(pane.select_name("f05"));
        assert_eq!(pane.cursor, 5);
        assert!(!pane.select_name("missing"));
        assert_eq!(pane.cursor, 5);
    }

    #[test]
    fn test_parent_row_sits_above_first_entry() {
        let (_tmp, mut pane) = pane_with(&["a", "b", "c"]);
        assert_eq!(pane.view_row(), 1);

        pane.move_by(-1);
        assert!(pane.on_parent_row());
        assert_eq!(pane.view_row(), 0);
        assert!(pane.current_entry().is_none());
        assert!(pane.target_set().is_empty());
        pane.toggle_current();
        assert!(pane.selection.is_empty());

        pane.move_by(-1);
        assert!(pane.on_parent_row());
        pane.move_by(2);
        assert!(!pane.on_parent_row());
        assert_eq!(pane.current_entry().unwrap().name, "b");
    }

    #[test]
    fn test_find_from_parent_row_considers_first_entry() {
        let (_tmp, mut pane) = pane_with(&["apple", "banana", "cherry"]);
        pane.move_by(-1);

        assert!(pane.find("APP"));
        assert!(!pane.on_parent_row());
        assert_eq!(pane.cursor, 0);

        pane.move_by(-1);
        assert!(pane.find_again(SearchDirection::Backward));
        assert_eq!(pane.current_entry().unwrap().name, "apple");
    }

    #[test]
    fn test_empty_listing_has_only_parent_row() {
        let (_tmp, pane) = pane_with(&[]);
        assert!(pane.on_parent_row());
        assert_eq!(pane.view_row(), 0);
    }
}
