//! src/model/marks.rs
//!
//! Named directory bookmarks kept as symlinks in one directory. The marks
//! directory is an ordinary directory, so it can be browsed like any other.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub name: String,
    /// `None` when the link target cannot be read.
    pub target: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct MarksStore {
    root: PathBuf,
}

impl MarksStore {
    /// Open the store, creating the marks directory and its parents.
    pub fn open(root: PathBuf) -> Result<Self, AppError> {
        fs::create_dir_all(&root).map_err(|e| {
            AppError::file_operation_failed("create marks directory", &root, e.to_string())
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mark `directory` as `name`, or its basename when `name` is `None`.
    /// An existing mark of the same name is replaced. Returns the name used.
    pub fn add(&self, name: Option<&str>, directory: &Path) -> Result<String, AppError> {
        let name: String = match name.map(str::trim).filter(|n: &&str| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| AppError::invalid_input("mark", "directory has no name"))?,
        };
        validate_mark_name(&name)?;

        let link: PathBuf = self.root.join(&name);
        match fs::remove_file(&link) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(AppError::file_operation_failed("mark", &link, e.to_string())),
        }
        symlink(directory, &link)
            .map_err(|e| AppError::file_operation_failed("mark", &link, e.to_string()))?;

        info!(
            marker = "MARK_ADDED",
            operation_type = "marks",
            name = %name,
            target = %directory.display(),
            "Mark saved"
        );
        Ok(name)
    }

    pub fn remove(&self, name: &str) -> Result<(), AppError> {
        validate_mark_name(name)?;
        let link: PathBuf = self.root.join(name);
        fs::remove_file(&link).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::invalid_input("mark", format!("no mark named '{name}'")),
            _ => AppError::file_operation_failed("unmark", &link, e.to_string()),
        })
    }

    /// All marks sorted by name.
    pub fn list(&self) -> Vec<Mark> {
        let Ok(read_dir) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut marks: Vec<Mark> = read_dir
            .filter_map(Result::ok)
            .map(|entry| Mark {
                name: entry.file_name().to_string_lossy().into_owned(),
                target: fs::read_link(entry.path()).ok(),
            })
            .collect();
        marks.sort_by(|a: &Mark, b: &Mark| a.name.cmp(&b.name));
        marks
    }

    /// Directory a mark points at; `None` for unknown marks or targets that
    /// are no longer directories.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        validate_mark_name(name).ok()?;
        let link: PathBuf = self.root.join(name);
        let target: PathBuf = fs::read_link(&link).ok()?;
        let target: PathBuf = if target.is_absolute() {
            target
        } else {
            self.root.join(target)
        };
        target.is_dir().then_some(target)
    }
}

fn validate_mark_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') {
        return Err(AppError::invalid_input(
            "mark",
            format!("'{name}' is not a valid mark name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, MarksStore) {
        let tmp = TempDir::new().unwrap();
        let store = MarksStore::open(tmp.path().join("config/pi/marks")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_open_creates_root_with_parents() {
        let (tmp, store) = store();
        assert!(tmp.path().join("config/pi/marks").is_dir());
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_marking_twice_leaves_one_mark() {
        let (tmp, store) = store();
        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();

        assert_eq!(store.add(Some("p"), &project).unwrap(), "p");
        assert_eq!(store.add(Some("p"), &project).unwrap(), "p");

        let marks = store.list();
        assert_eq!(marks.len(), 1);
        assert_eq!(store.resolve("p"), Some(project));
    }

    #[test]
    fn test_default_name_is_basename_and_remark_overwrites() {
        let (tmp, store) = store();
        let first = tmp.path().join("one/work");
        let second = tmp.path().join("two/work");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();

        assert_eq!(store.add(None, &first).unwrap(), "work");
        assert_eq!(store.add(Some("  "), &second).unwrap(), "work");

        assert_eq!(store.resolve("work"), Some(second));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_resolve_rejects_missing_and_non_directories() {
        let (tmp, store) = store();
        let file = tmp.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        store.add(Some("f"), &file).unwrap();

        assert_eq!(store.resolve("f"), None);
        assert_eq!(store.resolve("nope"), None);
        assert_eq!(store.resolve("../escape"), None);
    }

    #[test]
    fn test_remove_and_invalid_names() {
        let (tmp, store) = store();
        store.add(Some("home"), tmp.path()).unwrap();

        store.remove("home").unwrap();
        assert!(store.list().is_empty());
        assert!(store.remove("home").is_err());
        assert!(store.add(Some("a/b"), tmp.path()).is_err());
    }
}
