// pi-core/src/controller/action_dispatcher/clipboard_dispatcher.rs
// Yank, paste, link and unclip against the pi-clip clipboard

use std::path::PathBuf;

use pi_clip::{ClipboardOperation, PasteReport};

use crate::controller::actions::Effect;
use crate::error::AppError;
use crate::model::app_state::AppState;

pub(super) fn yank_targets(app: &mut AppState, operation: ClipboardOperation) -> Result<Effect, AppError> {
    let targets: Vec<PathBuf> = app.pane.target_set();
    yank(app, operation, targets)
}

/// Replace the clipboard and clear the selection.
pub(super) fn yank(
    app: &mut AppState,
    operation: ClipboardOperation,
    paths: Vec<PathBuf>,
) -> Result<Effect, AppError> {
    if paths.is_empty() {
        app.ui.show_info("nothing to yank");
        return Ok(Effect::None);
    }
    let count: usize = app.clipboard.yank(paths, operation);
    app.pane.clear_selection();
    app.ui
        .show_info(format!("{}: {count} in clipboard", operation.tag()));
    Ok(Effect::None)
}

pub(super) fn paste(app: &mut AppState) -> Result<Effect, AppError> {
    if app.clipboard.is_empty() {
        app.ui.show_info("clipboard is empty");
        return Ok(Effect::None);
    }
    let dest: PathBuf = app.cwd().to_path_buf();
    let report: PasteReport = app.clipboard.paste(&dest);
    finish(app, &report);
    Ok(Effect::None)
}

pub(super) fn link(app: &mut AppState) -> Result<Effect, AppError> {
    if app.clipboard.is_empty() {
        app.ui.show_info("clipboard is empty");
        return Ok(Effect::None);
    }
    let dest: PathBuf = app.cwd().to_path_buf();
    let report: PasteReport = app.clipboard.link(&dest);
    finish(app, &report);
    Ok(Effect::None)
}

pub(super) fn unclip(app: &mut AppState) -> Result<Effect, AppError> {
    app.clipboard.clear();
    app.ui.show_info("clipboard cleared");
    Ok(Effect::None)
}

fn finish(app: &mut AppState, report: &PasteReport) {
    app.pane.refresh();
    if let Some(name) = report.succeeded.first().and_then(|p: &PathBuf| p.file_name()) {
        app.pane.select_name(&name.to_string_lossy());
    }
    if report.has_failures() {
        app.ui.show_error(report.summary());
    } else {
        app.ui.show_success(report.summary());
    }
}
