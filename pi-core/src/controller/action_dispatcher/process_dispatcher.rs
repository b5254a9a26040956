// pi-core/src/controller/action_dispatcher/process_dispatcher.rs
// Requests for external programs and their completion

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::controller::actions::{Action, Effect};
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::operators::process_operator::{
    AfterProcess, ProcessOutcome, ProcessRequest, Program,
};

fn request(app: &AppState, program: Program) -> ProcessRequest {
    ProcessRequest::new(program, app.cwd().to_path_buf())
}

pub(super) fn open_file(app: &mut AppState, path: PathBuf) -> Result<Effect, AppError> {
    Ok(Effect::Spawn(request(app, Program::Opener).with_args([path])))
}

pub(super) fn edit_path(app: &mut AppState, path: PathBuf) -> Result<Effect, AppError> {
    Ok(Effect::Spawn(request(app, Program::Editor).with_args([path])))
}

/// Edit every non-directory in the target set.
pub(super) fn edit_targets(app: &mut AppState) -> Result<Effect, AppError> {
    let files: Vec<PathBuf> = app
        .pane
        .target_set()
        .into_iter()
        .filter(|p: &PathBuf| !p.is_dir())
        .collect();
    if files.is_empty() {
        app.ui.show_info("nothing to edit");
        return Ok(Effect::None);
    }
    Ok(Effect::Spawn(request(app, Program::Editor).with_args(files)))
}

pub(super) fn run_program(app: &mut AppState, action: &Action) -> Result<Effect, AppError> {
    let program: Program = match action {
        Action::FuzzyOpen => Program::FuzzyOpen,
        Action::FuzzyEdit => Program::FuzzyEdit,
        Action::VersionControl => Program::VersionControl,
        _ => Program::Shell,
    };
    Ok(Effect::Spawn(request(app, program)))
}

pub(super) fn shell_command(app: &mut AppState, line: String) -> Result<Effect, AppError> {
    if line.trim().is_empty() {
        return Ok(Effect::None);
    }
    Ok(Effect::Spawn(
        request(app, Program::Shell).with_args(["-c".to_string(), line]),
    ))
}

/// Offer the history list to the fuzzy finder.
pub(super) fn pick_history(app: &mut AppState) -> Result<Effect, AppError> {
    let candidates: Vec<String> = app
        .history
        .entries()
        .map(|p: &Path| p.to_string_lossy().into_owned())
        .collect();
    if candidates.is_empty() {
        app.ui.show_info("history is empty");
        return Ok(Effect::None);
    }
    Ok(Effect::Spawn(
        request(app, Program::FuzzyFinder).with_candidates(candidates),
    ))
}

/// Fold a finished external program back into the engine: report a
/// failure, re-read the listing and reveal whatever a picker chose.
pub fn complete_process(
    app: &mut AppState,
    request: &ProcessRequest,
    result: Result<ProcessOutcome, AppError>,
) {
    app.pane.refresh();

    let outcome: ProcessOutcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(
                marker = "PROCESS_FAILED",
                operation_type = "process",
                program = request.program.name(),
                error = %e,
                "External program could not run"
            );
            app.ui.show_error(e.to_string());
            return;
        }
    };

    if let Some(e) = outcome.failure() {
        app.ui.show_error(e.to_string());
        return;
    }

    if request.after == AfterProcess::RevealSelection
        && let Some(selection) = outcome.selection
    {
        super::dispatch(app, Action::Reveal(PathBuf::from(selection)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::ui_state::NotificationLevel;
    use std::fs;
    use tempfile::TempDir;

    fn app_in(root: &Path) -> AppState {
        let mut config = Config::default();
        config.paths.marks_dir = root.join("cfg/marks");
        config.paths.history_file = root.join("cfg/history");
        AppState::new(config, root.to_path_buf()).unwrap()
    }

    #[test]
    fn test_picked_file_is_revealed_in_its_parent() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("a/b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("z.txt"), b"z").unwrap();
        fs::write(deep.join("a.txt"), b"a").unwrap();
        let mut app = app_in(tmp.path());

        let request = ProcessRequest::new(Program::FuzzyFinder, tmp.path().to_path_buf())
            .with_candidates(vec![]);
        let outcome = ProcessOutcome {
            program: Program::FuzzyFinder,
            code: Some(0),
            success: true,
            selection: Some(deep.join("z.txt").to_string_lossy().into_owned()),
        };
        complete_process(&mut app, &request, Ok(outcome));

        assert_eq!(app.cwd(), deep.as_path());
        assert_eq!(app.pane.current_entry().unwrap().name, "z.txt");
    }

    #[test]
    fn test_failed_child_is_reported_and_engine_continues() {
        let tmp = TempDir::new().unwrap();
        let mut app = app_in(tmp.path());
        let request = ProcessRequest::new(Program::Editor, tmp.path().to_path_buf());
        let outcome = ProcessOutcome {
            program: Program::Editor,
            code: Some(2),
            success: false,
            selection: None,
        };

        complete_process(&mut app, &request, Ok(outcome));

        let note = app.ui.notification.as_ref().unwrap();
        assert_eq!(note.level, NotificationLevel::Error);
        assert!(note.message.contains("editor"));
        assert_eq!(app.cwd(), tmp.path());
    }

    #[test]
    fn test_edit_skips_directories() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();
        fs::write(tmp.path().join("f"), b"f").unwrap();
        let mut app = app_in(tmp.path());
        app.pane.refresh();
        // Listing: cfg, dir, f
        app.pane.toggle_index(1);
        app.pane.toggle_index(2);

        match edit_targets(&mut app).unwrap() {
            Effect::Spawn(request) => {
                assert_eq!(request.program, Program::Editor);
                assert_eq!(request.args, vec![tmp.path().join("f").into_os_string()]);
            }
            other => panic!("expected spawn, got {other:?}"),
        }
    }
}
