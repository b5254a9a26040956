// pi-core/src/controller/action_dispatcher/fs_dispatcher.rs
// Structural commands: create, rename, delete, chmod

use std::path::PathBuf;

use crate::controller::actions::Effect;
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::operators::file_system_operator::{FileSystemOperation, validate_name};

pub(super) fn create(app: &mut AppState, name: &str, directory: bool) -> Result<Effect, AppError> {
    let name: &str = validate_name(name)?;
    let path: PathBuf = app.cwd().join(name);
    let operation: FileSystemOperation = if directory {
        FileSystemOperation::CreateDirectory { path }
    } else {
        FileSystemOperation::CreateFile { path }
    };

    operation.execute()?;
    app.pane.refresh();
    app.pane.select_name(name);
    app.ui.show_success(format!("{} {name}", operation.operation_name()));
    Ok(Effect::None)
}

pub(super) fn rename(app: &mut AppState, source: PathBuf, new_name: String) -> Result<Effect, AppError> {
    let renamed: PathBuf = FileSystemOperation::Rename { source, new_name }.execute()?;
    app.pane.refresh();
    if let Some(name) = renamed.file_name() {
        app.pane.select_name(&name.to_string_lossy());
    }
    Ok(Effect::None)
}

/// Move to `Confirming` with the resolved target set.
pub(super) fn request_delete(app: &mut AppState) -> Result<Effect, AppError> {
    let targets: Vec<PathBuf> = app.pane.target_set();
    if !targets.is_empty() {
        app.ui.begin_confirm(targets);
    }
    Ok(Effect::None)
}

pub(super) fn delete_paths(app: &mut AppState, paths: Vec<PathBuf>) -> Result<Effect, AppError> {
    let operations: Vec<FileSystemOperation> = paths
        .into_iter()
        .map(|path: PathBuf| FileSystemOperation::Delete { path })
        .collect();
    let result: Result<Effect, AppError> = run_batch(app, "rm", &operations);
    app.pane.clear_selection();
    result
}

/// Flip the execute bits of every entry in the target set.
pub(super) fn toggle_executable(app: &mut AppState) -> Result<Effect, AppError> {
    let operations: Vec<FileSystemOperation> = app
        .pane
        .target_set()
        .into_iter()
        .map(|path: PathBuf| FileSystemOperation::ToggleExecutable { path })
        .collect();
    run_batch(app, "chmod", &operations)
}

/// Run every operation, refresh once, and report the first failure.
fn run_batch(
    app: &mut AppState,
    label: &str,
    operations: &[FileSystemOperation],
) -> Result<Effect, AppError> {
    if operations.is_empty() {
        return Ok(Effect::None);
    }

    let mut first_error: Option<AppError> = None;
    let mut failed: usize = 0;
    for operation in operations {
        if let Err(e) = operation.execute() {
            failed += 1;
            first_error.get_or_insert(e);
        }
    }
    app.pane.refresh();

    match first_error {
        None => {
            app.ui
                .show_success(format!("{label}: {} done", operations.len()));
            Ok(Effect::None)
        }
        Some(e) if operations.len() == 1 => Err(e),
        Some(e) => Err(e.with_context(format!(
            "{label}: {} done, {failed} failed",
            operations.len() - failed
        ))),
    }
}
