//! src/operators/process_operator.rs
//! ============================================================================
//! # ProcessOperator: hand the terminal to an external program
//!
//! The engine never spawns anything itself; it returns a [`ProcessRequest`]
//! and the front end runs it here. Every program runs with its working
//! directory bound to the listing directory and receives its paths as
//! trailing arguments. The keyboard front end wraps the call in
//! [`SuspendedTerminal`] so raw mode and the alternate screen are restored
//! on every exit path.

use std::ffi::OsString;
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output, Stdio};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use tracing::{info, warn};

use crate::config::ProgramsConfig;
use crate::error::AppError;
use crate::view::ui::AppTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Program {
    Editor,
    Opener,
    Shell,
    FuzzyFinder,
    FuzzyOpen,
    FuzzyEdit,
    VersionControl,
}

impl Program {
    pub fn command_line(self, programs: &ProgramsConfig) -> Vec<String> {
        let line: &str = match self {
            Self::Editor => &programs.editor,
            Self::Opener => &programs.opener,
            Self::Shell => &programs.shell,
            Self::FuzzyFinder => &programs.fuzzy_finder,
            Self::FuzzyOpen => &programs.fuzzy_open,
            Self::FuzzyEdit => &programs.fuzzy_edit,
            Self::VersionControl => &programs.version_control,
        };
        line.split_whitespace().map(str::to_string).collect()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Opener => "opener",
            Self::Shell => "shell",
            Self::FuzzyFinder => "fuzzy finder",
            Self::FuzzyOpen => "fuzzy open",
            Self::FuzzyEdit => "fuzzy edit",
            Self::VersionControl => "version control",
        }
    }
}

/// What the engine does with the outcome once the child has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterProcess {
    Refresh,
    /// Reveal the line the fuzzy finder printed.
    RevealSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: Program,
    pub cwd: PathBuf,
    pub args: Vec<OsString>,
    /// Candidate lines written to the child's stdin; its stdout is captured.
    pub candidates: Option<Vec<String>>,
    pub after: AfterProcess,
}

impl ProcessRequest {
    pub fn new(program: Program, cwd: PathBuf) -> Self {
        Self {
            program,
            cwd,
            args: Vec::new(),
            candidates: None,
            after: AfterProcess::Refresh,
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = Some(candidates);
        self.after = AfterProcess::RevealSelection;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub program: Program,
    pub code: Option<i32>,
    pub success: bool,
    /// First non-empty stdout line, for requests with candidates.
    pub selection: Option<String>,
}

impl ProcessOutcome {
    fn from_status(program: Program, status: ExitStatus, selection: Option<String>) -> Self {
        Self {
            program,
            code: status.code(),
            success: status.success(),
            selection,
        }
    }

    pub fn failure(&self) -> Option<AppError> {
        (!self.success).then(|| AppError::ExternalCmd {
            cmd: self.program.name().to_string(),
            code: self.code,
        })
    }
}

/// Run `request` to completion, blocking the caller.
pub fn run(request: &ProcessRequest, programs: &ProgramsConfig) -> Result<ProcessOutcome, AppError> {
    let argv: Vec<String> = request.program.command_line(programs);
    let Some((program, prefix)) = argv.split_first() else {
        return Err(AppError::invalid_input(
            "program",
            format!("no {} configured", request.program.name()),
        ));
    };

    let mut command: Command = Command::new(program);
    command
        .args(prefix)
        .args(&request.args)
        .current_dir(&request.cwd);

    info!(
        marker = "PROCESS_SPAWN",
        operation_type = "process",
        program = %program,
        cwd = %request.cwd.display(),
        args_count = request.args.len(),
        "Spawning external program"
    );

    let spawn_err = |e: io::Error| AppError::ExternalCmd {
        cmd: format!("{program}: {e}"),
        code: None,
    };

    let outcome: ProcessOutcome = match &request.candidates {
        None => {
            let status: ExitStatus = command.status().map_err(spawn_err)?;
            ProcessOutcome::from_status(request.program, status, None)
        }
        Some(candidates) => {
            let mut child = command
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .spawn()
                .map_err(spawn_err)?;

            if let Some(mut stdin) = child.stdin.take() {
                let mut payload: String = candidates.join("\n");
                payload.push('\n');
                // The finder may exit before reading everything.
                if let Err(e) = stdin.write_all(payload.as_bytes())
                    && e.kind() != ErrorKind::BrokenPipe
                {
                    warn!(
                        marker = "PROCESS_STDIN_FAILED",
                        operation_type = "process",
                        error = %e,
                        "Failed to write candidates"
                    );
                }
            }

            let output: Output = child.wait_with_output().map_err(spawn_err)?;
            let selection: Option<String> = String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .find(|line: &&str| !line.is_empty())
                .map(str::to_string);
            ProcessOutcome::from_status(request.program, output.status, selection)
        }
    };

    if outcome.success {
        info!(
            marker = "PROCESS_EXIT",
            operation_type = "process",
            program = %program,
            "External program finished"
        );
    } else {
        warn!(
            marker = "PROCESS_EXIT_FAILED",
            operation_type = "process",
            program = %program,
            code = ?outcome.code,
            "External program failed"
        );
    }

    Ok(outcome)
}

/// Leaves raw mode and the alternate screen while alive; dropping it
/// re-enters both and forces a full redraw.
pub struct SuspendedTerminal<'a> {
    terminal: &'a mut AppTerminal,
}

impl<'a> SuspendedTerminal<'a> {
    pub fn new(terminal: &'a mut AppTerminal) -> Result<Self, AppError> {
        disable_raw_mode().map_err(|e| AppError::Terminal(e.to_string()))?;
        execute!(io::stdout(), LeaveAlternateScreen, Show)
            .map_err(|e| AppError::Terminal(e.to_string()))?;
        Ok(Self { terminal })
    }

    /// Show `message` on the plain terminal and block until Enter.
    pub fn acknowledge(&self, message: &str) {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout, "\n{message}");
        let _ = write!(stdout, "Press Enter to continue");
        let _ = stdout.flush();
        let mut line: String = String::new();
        let _ = io::stdin().lock().read_line(&mut line);
    }
}

impl Drop for SuspendedTerminal<'_> {
    fn drop(&mut self) {
        let restored = enable_raw_mode()
            .and_then(|()| execute!(io::stdout(), EnterAlternateScreen, Hide))
            .and_then(|()| self.terminal.clear());
        if let Err(e) = restored {
            warn!(
                marker = "TERMINAL_RESUME_FAILED",
                operation_type = "terminal",
                error = %e,
                "Failed to resume terminal after external program"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn programs_with(editor: &str, finder: &str) -> ProgramsConfig {
        ProgramsConfig {
            editor: editor.to_string(),
            fuzzy_finder: finder.to_string(),
            ..ProgramsConfig::default()
        }
    }

    #[test]
    fn test_command_line_splits_on_whitespace() {
        let programs = programs_with("vim  -p", "fzy");
        assert_eq!(Program::Editor.command_line(&programs), ["vim", "-p"]);
    }

    #[test]
    fn test_runs_in_requested_directory() {
        let tmp = TempDir::new().unwrap();
        let programs = programs_with("touch", "fzy");
        let request = ProcessRequest::new(Program::Editor, tmp.path().to_path_buf())
            .with_args(["created-here"]);

        let outcome = run(&request, &programs).unwrap();

        assert!(outcome.success);
        assert!(outcome.failure().is_none());
        assert!(tmp.path().join("created-here").exists());
    }

    #[test]
    fn test_nonzero_exit_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let programs = programs_with("false", "fzy");
        let request = ProcessRequest::new(Program::Editor, tmp.path().to_path_buf());

        let outcome = run(&request, &programs).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.code, Some(1));
        assert!(matches!(
            outcome.failure(),
            Some(AppError::ExternalCmd { .. })
        ));
    }

    #[test]
    fn test_candidates_go_to_stdin_and_selection_comes_back() {
        let tmp = TempDir::new().unwrap();
        let programs = programs_with("edit", "tail -n 1");
        let request = ProcessRequest::new(Program::FuzzyFinder, tmp.path().to_path_buf())
            .with_candidates(vec!["/a".into(), "/b/c".into()]);

        let outcome = run(&request, &programs).unwrap();

        assert_eq!(request.after, AfterProcess::RevealSelection);
        assert_eq!(outcome.selection.as_deref(), Some("/b/c"));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let programs = programs_with("pi-test-no-such-program", "fzy");
        let request = ProcessRequest::new(Program::Editor, tmp.path().to_path_buf());

        assert!(run(&request, &programs).is_err());
    }
}
