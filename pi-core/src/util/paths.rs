//! src/util/paths.rs
//!
//! Path helpers shared by the prompts, the REPL and the title line.

use std::path::{Component, Path, PathBuf};

use directories::BaseDirs;

pub fn home_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs: BaseDirs| dirs.home_dir().to_path_buf())
}

/// Show `path` with the home directory abbreviated to `~`.
pub fn tilde(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Expand a leading `~` or `~/`. `~user` forms are left alone.
pub fn expand_tilde(input: &str, home: Option<&Path>) -> PathBuf {
    match (input, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (s, Some(home)) if s.starts_with("~/") => home.join(&s[2..]),
        _ => PathBuf::from(input),
    }
}

/// Lexically remove `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: PathBuf = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root.
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve user input against `cwd`: tilde expansion, relative joins and
/// lexical normalization.
pub fn resolve_input(input: &str, cwd: &Path, home: Option<&Path>) -> PathBuf {
    let expanded: PathBuf = expand_tilde(input.trim(), home);
    if expanded.is_absolute() {
        normalize(&expanded)
    } else {
        normalize(&cwd.join(expanded))
    }
}
