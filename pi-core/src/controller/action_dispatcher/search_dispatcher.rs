// pi-core/src/controller/action_dispatcher/search_dispatcher.rs
// Hidden files, listing filter and incremental find

use compact_str::CompactString;

use crate::controller::actions::{Action, Effect};
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::model::fs_state::SearchDirection;

pub(super) fn toggle_hidden(app: &mut AppState) -> Result<Effect, AppError> {
    app.pane.show_hidden = !app.pane.show_hidden;
    app.pane.refresh();
    app.ui.show_info(if app.pane.show_hidden {
        "showing hidden files"
    } else {
        "hiding hidden files"
    });
    Ok(Effect::None)
}

/// `None` or an empty pattern clears the filter.
pub(super) fn set_filter(app: &mut AppState, pattern: Option<String>) -> Result<Effect, AppError> {
    app.pane.filter = pattern
        .filter(|p: &String| !p.is_empty())
        .map(CompactString::from);
    app.pane.refresh();
    if let Some(filter) = &app.pane.filter
        && app.pane.entries.is_empty()
    {
        app.ui.show_info(format!("nothing matches '{filter}'"));
    }
    Ok(Effect::None)
}

pub(super) fn clear_filter(app: &mut AppState) -> Result<Effect, AppError> {
    if app.pane.filter.take().is_some() {
        app.pane.refresh();
    }
    Ok(Effect::None)
}

pub(super) fn find(app: &mut AppState, pattern: &str) -> Result<Effect, AppError> {
    if pattern.is_empty() {
        return Ok(Effect::None);
    }
    if !app.pane.find(pattern) {
        app.ui.show_info(format!("no match for '{pattern}'"));
    }
    Ok(Effect::None)
}

pub(super) fn find_again(app: &mut AppState, action: &Action) -> Result<Effect, AppError> {
    let direction: SearchDirection = match action {
        Action::FindPrevious => SearchDirection::Backward,
        _ => SearchDirection::Forward,
    };
    let Some(pattern) = app.pane.last_search.clone() else {
        app.ui.show_info("no search pattern");
        return Ok(Effect::None);
    };
    if !app.pane.find_again(direction) {
        app.ui.show_info(format!("no match for '{pattern}'"));
    }
    Ok(Effect::None)
}
