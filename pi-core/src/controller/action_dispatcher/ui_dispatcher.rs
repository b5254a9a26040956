// pi-core/src/controller/action_dispatcher/ui_dispatcher.rs
// Modal input: prompts, delete confirmation, numeric jump and help

use std::path::PathBuf;

use compact_str::CompactString;

use crate::controller::actions::{Effect, PromptKind};
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::model::ui_state::UIMode;

use super::fs_dispatcher;

pub(super) fn begin_prompt(app: &mut AppState, kind: PromptKind) -> Result<Effect, AppError> {
    let initial: CompactString = match kind {
        PromptKind::Filter => app.pane.filter.clone().unwrap_or_default(),
        _ => CompactString::default(),
    };
    app.ui.begin_prompt(kind, initial);
    Ok(Effect::None)
}

/// Rename prompt pre-filled with the cursor entry's name.
pub(super) fn begin_rename(app: &mut AppState) -> Result<Effect, AppError> {
    let Some(entry) = app.pane.current_entry() else {
        return Ok(Effect::None);
    };
    let (path, name): (PathBuf, CompactString) = (entry.path.clone(), entry.name.clone());
    app.ui.begin_prompt(PromptKind::Rename(path), name);
    Ok(Effect::None)
}

pub(super) fn prompt_input(app: &mut AppState, ch: char) -> Result<Effect, AppError> {
    if matches!(app.ui.mode, UIMode::Prompting(_)) {
        app.ui.insert_char(ch);
    }
    Ok(Effect::None)
}

pub(super) fn prompt_backspace(app: &mut AppState) -> Result<Effect, AppError> {
    if matches!(app.ui.mode, UIMode::Prompting(_)) {
        app.ui.delete_char_before();
    }
    Ok(Effect::None)
}

/// Abort whatever is pending. Nothing on disk changes.
pub(super) fn cancel(app: &mut AppState) -> Result<Effect, AppError> {
    app.ui.abort();
    Ok(Effect::None)
}

/// `true` deletes the paths shown in the confirmation; anything else aborts.
pub(super) fn confirm(app: &mut AppState, yes: bool) -> Result<Effect, AppError> {
    match app.ui.take_confirm() {
        Some(paths) if yes => fs_dispatcher::delete_paths(app, paths),
        _ => Ok(Effect::None),
    }
}

pub(super) fn digit_input(app: &mut AppState, digit: char) -> Result<Effect, AppError> {
    if digit.is_ascii_digit() {
        app.ui.push_digit(digit);
    }
    Ok(Effect::None)
}

/// Jump to the 1-based index typed so far. An index outside the listing
/// leaves the cursor alone.
pub(super) fn commit_jump(app: &mut AppState) -> Result<Effect, AppError> {
    let index: Option<usize> = app
        .ui
        .take_jump()
        .and_then(|i: usize| i.checked_sub(1))
        .filter(|i: &usize| *i < app.pane.entries.len());
    if let Some(index) = index {
        app.pane.jump_to(index);
    }
    Ok(Effect::None)
}

pub(super) fn toggle_help(app: &mut AppState) -> Result<Effect, AppError> {
    app.ui.show_help = !app.ui.show_help;
    Ok(Effect::None)
}
