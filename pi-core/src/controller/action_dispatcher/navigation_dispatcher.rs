// pi-core/src/controller/action_dispatcher/navigation_dispatcher.rs
// Cursor movement, directory changes, marks and selection

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::controller::actions::{Action, Effect, PromptKind};
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::util::paths;

use super::process_dispatcher;

pub(super) fn move_cursor(app: &mut AppState, action: &Action) -> Result<Effect, AppError> {
    let pane = &mut app.pane;
    match action {
        Action::MoveBy(delta) => pane.move_by(*delta),
        Action::PageUp => pane.page_up(),
        Action::PageDown => pane.page_down(),
        Action::SelectFirst => pane.select_first(),
        Action::SelectLast => pane.select_last(),
        Action::JumpTo(index) => pane.jump_to(*index),
        _ => {}
    }
    Ok(Effect::None)
}

pub(super) fn enter(app: &mut AppState) -> Result<Effect, AppError> {
    if app.pane.on_parent_row() {
        return parent(app);
    }
    let Some(entry) = app.pane.current_entry() else {
        return Ok(Effect::None);
    };
    let (path, is_dir): (PathBuf, bool) = (entry.path.clone(), entry.is_dir);

    if is_dir {
        app.change_directory(&path)?;
        Ok(Effect::None)
    } else {
        process_dispatcher::open_file(app, path)
    }
}

pub(super) fn parent(app: &mut AppState) -> Result<Effect, AppError> {
    let cwd: PathBuf = app.cwd().to_path_buf();
    let Some(parent) = cwd.parent() else {
        return Ok(Effect::None);
    };

    app.change_directory(parent)?;
    if let Some(left) = cwd.file_name() {
        app.pane.select_name(&left.to_string_lossy());
    }
    Ok(Effect::None)
}

pub(super) fn back(app: &mut AppState) -> Result<Effect, AppError> {
    match app.history.previous().map(Path::to_path_buf) {
        Some(previous) => app.change_directory(&previous)?,
        None => app.ui.show_info("no previous directory"),
    }
    Ok(Effect::None)
}

pub(super) fn history_back(app: &mut AppState) -> Result<Effect, AppError> {
    let target: Option<PathBuf> = app.history.mru_back(app.cwd()).map(Path::to_path_buf);
    match target {
        Some(target) => app.change_directory(&target)?,
        None => app.ui.show_info("history is empty"),
    }
    Ok(Effect::None)
}

pub(super) fn home(app: &mut AppState) -> Result<Effect, AppError> {
    let home: PathBuf = app
        .home
        .clone()
        .ok_or_else(|| AppError::Other("home directory is unknown".into()))?;
    change_directory(app, &home)
}

pub(super) fn change_directory(app: &mut AppState, dir: &Path) -> Result<Effect, AppError> {
    app.change_directory(dir)?;
    Ok(Effect::None)
}

/// Directories are entered; anything else that exists is opened.
pub(super) fn go_to(app: &mut AppState, input: &str) -> Result<Effect, AppError> {
    if input.trim().is_empty() {
        return Ok(Effect::None);
    }
    let target: PathBuf = app.resolve_input(input);
    if target.is_dir() {
        return change_directory(app, &target);
    }
    if fs::symlink_metadata(&target).is_err() {
        return Err(AppError::NotFound(target));
    }
    process_dispatcher::open_file(app, target)
}

pub(super) fn go_to_marks(app: &mut AppState) -> Result<Effect, AppError> {
    let root: PathBuf = app.marks()?.root().to_path_buf();
    app.change_directory(&root)?;
    app.ui.begin_prompt(PromptKind::Search, "");
    Ok(Effect::None)
}

pub(super) fn go_mark(app: &mut AppState, name: &str) -> Result<Effect, AppError> {
    let target: PathBuf = app
        .marks()?
        .resolve(name.trim())
        .ok_or_else(|| AppError::invalid_input("mark", format!("no mark named '{}'", name.trim())))?;
    change_directory(app, &target)
}

/// Directory: enter it. Anything else: enter its parent and put the cursor
/// on it.
pub(super) fn reveal(app: &mut AppState, path: &Path) -> Result<Effect, AppError> {
    let path: PathBuf = paths::normalize(path);
    if path.is_dir() {
        return change_directory(app, &path);
    }
    if fs::symlink_metadata(&path).is_err() {
        return Err(AppError::NotFound(path));
    }

    let parent: &Path = path
        .parent()
        .ok_or_else(|| AppError::navigation_failed(&path, "has no parent"))?;
    if parent != app.cwd() {
        app.change_directory(parent)?;
    }
    if let Some(name) = path.file_name() {
        app.pane.select_name(&name.to_string_lossy());
    }
    Ok(Effect::None)
}

/// A path handed over by a second invocation.
pub(super) fn open_path(app: &mut AppState, path: &Path) -> Result<Effect, AppError> {
    info!(
        marker = "OPEN_PATH_RECEIVED",
        operation_type = "single_instance",
        path = %path.display(),
        "Path received from another invocation"
    );
    app.ui.abort();
    app.ui.show_help = false;

    let path: PathBuf = paths::normalize(path);
    if fs::symlink_metadata(&path).is_err() {
        app.ui.show_warning(format!("no such path: {}", path.display()));
        return Ok(Effect::None);
    }
    reveal(app, &path)?;
    if path.is_dir() {
        Ok(Effect::None)
    } else {
        process_dispatcher::open_file(app, path)
    }
}

pub(super) fn refresh(app: &mut AppState) -> Result<Effect, AppError> {
    app.pane.refresh();
    Ok(Effect::None)
}

pub(super) fn toggle_selection(app: &mut AppState) -> Result<Effect, AppError> {
    app.pane.toggle_current();
    Ok(Effect::None)
}

pub(super) fn toggle_index(app: &mut AppState, index: usize) -> Result<Effect, AppError> {
    if !app.pane.toggle_index(index) {
        return Err(AppError::invalid_input(
            "index",
            format!("{} is not in the listing", index + 1),
        ));
    }
    Ok(Effect::None)
}

pub(super) fn clear_selection(app: &mut AppState) -> Result<Effect, AppError> {
    app.pane.clear_selection();
    Ok(Effect::None)
}

pub(super) fn mark(app: &mut AppState, name: Option<&str>) -> Result<Effect, AppError> {
    let cwd: PathBuf = app.cwd().to_path_buf();
    let name: String = app.marks()?.add(name, &cwd)?;
    app.ui.show_success(format!("marked {name}"));
    Ok(Effect::None)
}

pub(super) fn unmark(app: &mut AppState, name: &str) -> Result<Effect, AppError> {
    app.marks()?.remove(name.trim())?;
    app.ui.show_success(format!("unmarked {}", name.trim()));
    app.pane.refresh();
    Ok(Effect::None)
}
