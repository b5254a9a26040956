//! ActionDispatcher: applies `Action`s to the engine state.
//!
//! The dispatcher is the single place where commands mutate [`AppState`]:
//! - Cursor, navigation, marks and selection go to `navigation_dispatcher`
//! - Hidden files, filter and find go to `search_dispatcher`
//! - Create, rename, delete and chmod go to `fs_dispatcher`
//! - Yank, paste, link and unclip go to `clipboard_dispatcher`
//! - Prompt, confirmation, jump prefix and help go to `ui_dispatcher`
//! - Prompt submission is turned into a follow-up action by `command_dispatcher`
//! - External programs are requested by `process_dispatcher`
//!
//! Errors never escape: they are logged and become the status message.
//! Every structural command leaves the listing freshly read from disk.

mod clipboard_dispatcher;
mod command_dispatcher;
mod fs_dispatcher;
mod navigation_dispatcher;
mod process_dispatcher;
mod search_dispatcher;
mod ui_dispatcher;

pub use process_dispatcher::complete_process;

use tracing::{debug, warn};

use crate::controller::actions::{Action, Effect};
use crate::error::AppError;
use crate::model::app_state::AppState;

/// Apply one action and report what the front end must do next.
pub fn dispatch(app: &mut AppState, action: Action) -> Effect {
    debug!(
        marker = "ACTION_DISPATCH",
        operation_type = "dispatch",
        action = ?action,
        "Dispatching action"
    );

    let structural: bool = action.is_structural();
    match route(app, action) {
        Ok(effect) => effect,
        Err(e) => {
            warn!(
                marker = "ACTION_FAILED",
                operation_type = "dispatch",
                error = %e,
                "Action failed"
            );
            if structural {
                app.pane.refresh();
            }
            app.ui.show_error(e.to_string());
            Effect::None
        }
    }
}

fn route(app: &mut AppState, action: Action) -> Result<Effect, AppError> {
    use Action as A;

    match action {
        A::MoveBy(_)
        | A::PageUp
        | A::PageDown
        | A::SelectFirst
        | A::SelectLast
        | A::JumpTo(_) => navigation_dispatcher::move_cursor(app, &action),
        A::Enter => navigation_dispatcher::enter(app),
        A::Parent => navigation_dispatcher::parent(app),
        A::Back => navigation_dispatcher::back(app),
        A::HistoryBack => navigation_dispatcher::history_back(app),
        A::Home => navigation_dispatcher::home(app),
        A::ChangeDirectory(dir) => navigation_dispatcher::change_directory(app, &dir),
        A::GoTo(input) => navigation_dispatcher::go_to(app, &input),
        A::GoToMarks => navigation_dispatcher::go_to_marks(app),
        A::GoMark(name) => navigation_dispatcher::go_mark(app, &name),
        A::Reveal(path) => navigation_dispatcher::reveal(app, &path),
        A::OpenPath(path) => navigation_dispatcher::open_path(app, &path),
        A::Refresh => navigation_dispatcher::refresh(app),
        A::ToggleSelection => navigation_dispatcher::toggle_selection(app),
        A::ToggleIndex(index) => navigation_dispatcher::toggle_index(app, index),
        A::ClearSelection => navigation_dispatcher::clear_selection(app),
        A::Mark(name) => navigation_dispatcher::mark(app, name.as_deref()),
        A::Unmark(name) => navigation_dispatcher::unmark(app, &name),

        A::ToggleHidden => search_dispatcher::toggle_hidden(app),
        A::SetFilter(pattern) => search_dispatcher::set_filter(app, pattern),
        A::ClearFilter => search_dispatcher::clear_filter(app),
        A::Find(pattern) => search_dispatcher::find(app, &pattern),
        A::FindNext | A::FindPrevious => search_dispatcher::find_again(app, &action),

        A::CreateFile(name) => fs_dispatcher::create(app, &name, false),
        A::CreateDirectory(name) => fs_dispatcher::create(app, &name, true),
        A::Rename { source, new_name } => fs_dispatcher::rename(app, source, new_name),
        A::RequestDelete => fs_dispatcher::request_delete(app),
        A::DeletePaths(paths) => fs_dispatcher::delete_paths(app, paths),
        A::ToggleExecutable => fs_dispatcher::toggle_executable(app),

        A::Yank(operation) => clipboard_dispatcher::yank_targets(app, operation),
        A::YankPaths(operation, paths) => clipboard_dispatcher::yank(app, operation, paths),
        A::Paste => clipboard_dispatcher::paste(app),
        A::Link => clipboard_dispatcher::link(app),
        A::Unclip => clipboard_dispatcher::unclip(app),

        A::Edit => process_dispatcher::edit_targets(app),
        A::EditPath(path) => process_dispatcher::edit_path(app, path),
        A::OpenWith(path) => process_dispatcher::open_file(app, path),
        A::FuzzyOpen
        | A::FuzzyEdit
        | A::Shell
        | A::VersionControl => process_dispatcher::run_program(app, &action),
        A::ShellCommand(line) => process_dispatcher::shell_command(app, line),
        A::PickHistory => process_dispatcher::pick_history(app),

        A::BeginPrompt(kind) => ui_dispatcher::begin_prompt(app, kind),
        A::BeginRename => ui_dispatcher::begin_rename(app),
        A::PromptInput(ch) => ui_dispatcher::prompt_input(app, ch),
        A::PromptBackspace => ui_dispatcher::prompt_backspace(app),
        A::SubmitPrompt => command_dispatcher::submit_prompt(app),
        A::CancelPrompt => ui_dispatcher::cancel(app),
        A::Confirm(yes) => ui_dispatcher::confirm(app, yes),
        A::DigitInput(digit) => ui_dispatcher::digit_input(app, digit),
        A::CommitJump => ui_dispatcher::commit_jump(app),
        A::CancelJump => ui_dispatcher::cancel(app),
        A::ToggleHelp => ui_dispatcher::toggle_help(app),

        A::Quit => Ok(Effect::Quit),
        A::NoOp => Ok(Effect::None),
    }
}
