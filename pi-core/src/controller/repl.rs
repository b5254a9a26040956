//! src/controller/repl.rs
//! ============================================================================
//! # Repl: line-oriented front end
//!
//! Reads one command per line, translates it into [`Action`]s and prints the
//! outcome. The first word is matched exactly against the command table; a
//! line that is not a command but names an existing path or listing index is
//! an implicit open; everything else goes to the shell. A leading `!` always
//! goes to the shell.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use pi_clip::ClipboardOperation;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use crate::controller::action_dispatcher::{complete_process, dispatch};
use crate::controller::actions::{Action, Effect};
use crate::error::AppError;
use crate::model::app_state::AppState;
use crate::model::marks::Mark;
use crate::operators::process_operator;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    List,
    Cd(Option<String>),
    Parent,
    Back,
    History,
    Open(String),
    Edit(String),
    Touch(String),
    Mkdir(String),
    Mv { target: String, new_name: String },
    Rm(Vec<String>),
    Select(Vec<String>),
    Unselect,
    Yank(ClipboardOperation, Vec<String>),
    Paste,
    Link,
    Unclip,
    Clip,
    Find(String),
    Next,
    Prev,
    Filter(Option<String>),
    Hidden,
    Chmod,
    Mark(Option<String>),
    Marks,
    Go(String),
    Unmark(String),
    Help,
    Quit,
    /// An existing path or index given on its own.
    Implicit(String),
    Shell(String),
    /// A known command used with missing arguments.
    Usage(&'static str),
}

const COMMANDS: &[(&str, &str)] = &[
    ("ls", "list the current directory"),
    ("cd [target]", "change directory (none: home, -: back, ..: parent)"),
    ("..", "parent directory"),
    ("back", "most recent other directory"),
    ("hist", "show history"),
    ("open <target>", "open with the opener"),
    ("edit <target>", "open with the editor"),
    ("touch <name>", "new file"),
    ("mkdir <name>", "new directory"),
    ("mv <target> <new>", "rename"),
    ("rm [targets]", "delete after confirmation"),
    ("sel <targets>", "toggle selection"),
    ("unsel", "clear selection"),
    ("cp [targets]", "yank for copy"),
    ("cut [targets]", "yank for move"),
    ("paste", "paste clipboard here"),
    ("link", "link clipboard here"),
    ("unclip", "empty clipboard"),
    ("clip", "show clipboard"),
    ("find <pattern>", "search"),
    ("next / prev", "repeat search"),
    ("filter [pattern]", "filter listing (none: clear)"),
    ("hidden", "toggle hidden files"),
    ("chmod", "toggle executable bits"),
    ("mark [name]", "mark current directory"),
    ("marks", "list marks"),
    ("go <mark>", "go to mark"),
    ("unmark <name>", "remove mark"),
    ("help", "this list"),
    ("quit / exit", "leave"),
    ("!<command>", "run in the shell"),
];

impl ReplCommand {
    /// Parse `line`. `resolves` tells whether a bare word names an existing
    /// path or listing index.
    pub fn parse(line: &str, resolves: impl Fn(&str) -> bool) -> Self {
        let line: &str = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if let Some(command) = line.strip_prefix('!') {
            return Self::Shell(command.trim().to_string());
        }

        let (word, rest): (&str, &str) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        let rest_opt: Option<String> = (!rest.is_empty()).then(|| rest.to_string());

        match word {
            "ls" => Self::List,
            "cd" => Self::Cd(rest_opt),
            ".." => Self::Parent,
            "back" => Self::Back,
            "hist" => Self::History,
            "open" => rest_opt.map_or(Self::Usage("open <target>"), Self::Open),
            "edit" => rest_opt.map_or(Self::Usage("edit <target>"), Self::Edit),
            "touch" => rest_opt.map_or(Self::Usage("touch <name>"), Self::Touch),
            "mkdir" => rest_opt.map_or(Self::Usage("mkdir <name>"), Self::Mkdir),
            "mv" => match rest.split_once(char::is_whitespace) {
                Some((target, new_name)) if !new_name.trim().is_empty() => Self::Mv {
                    target: target.to_string(),
                    new_name: new_name.trim().to_string(),
                },
                _ => Self::Usage("mv <target> <new>"),
            },
            "rm" => Self::Rm(args),
            "sel" if args.is_empty() => Self::Usage("sel <targets>"),
            "sel" => Self::Select(args),
            "unsel" => Self::Unselect,
            "cp" => Self::Yank(ClipboardOperation::Copy, args),
            "cut" => Self::Yank(ClipboardOperation::Move, args),
            "paste" => Self::Paste,
            "link" => Self::Link,
            "unclip" => Self::Unclip,
            "clip" => Self::Clip,
            "find" => rest_opt.map_or(Self::Usage("find <pattern>"), Self::Find),
            "next" => Self::Next,
            "prev" => Self::Prev,
            "filter" => Self::Filter(rest_opt),
            "hidden" => Self::Hidden,
            "chmod" => Self::Chmod,
            "mark" => Self::Mark(rest_opt),
            "marks" => Self::Marks,
            "go" => rest_opt.map_or(Self::Usage("go <mark>"), Self::Go),
            "unmark" => rest_opt.map_or(Self::Usage("unmark <name>"), Self::Unmark),
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            // the whole line is the token so that names with spaces open
            _ if resolves(line) => Self::Implicit(line.to_string()),
            _ => Self::Shell(line.to_string()),
        }
    }
}

/// Whether the loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplFlow {
    Continue,
    Quit,
}

pub struct Repl<R: BufRead, W: Write> {
    app: AppState,
    input: R,
    output: W,
    open_rx: Option<UnboundedReceiver<PathBuf>>,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(app: AppState, input: R, output: W) -> Self {
        Self {
            app,
            input,
            output,
            open_rx: None,
        }
    }

    /// Paths from other invocations, applied before each prompt.
    #[must_use]
    pub fn with_open_requests(mut self, open_rx: UnboundedReceiver<PathBuf>) -> Self {
        self.open_rx = Some(open_rx);
        self
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn into_parts(self) -> (AppState, W) {
        (self.app, self.output)
    }

    /// Read and execute lines until `quit` or end of input.
    pub fn run(&mut self) -> Result<(), AppError> {
        info!(
            marker = "REPL_START",
            operation_type = "repl",
            cwd = %self.app.cwd().display(),
            "Line interface started"
        );
        self.print_listing()?;

        loop {
            self.drain_open_requests()?;
            write!(self.output, "{}", self.prompt())?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };
            if self.execute(&line)? == ReplFlow::Quit {
                break;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, AppError> {
        let mut line: String = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn prompt(&self) -> String {
        let mut prompt: String = self.app.display_cwd();
        if !self.app.pane.selection.is_empty() {
            prompt.push_str(&format!(" [{}]", self.app.pane.selection.len()));
        }
        if !self.app.clipboard.is_empty() {
            prompt.push_str(&format!(
                " {}:{}",
                self.app.clipboard.operation().tag(),
                self.app.clipboard.len()
            ));
        }
        prompt.push_str("> ");
        prompt
    }

    fn drain_open_requests(&mut self) -> Result<(), AppError> {
        let mut received: Vec<PathBuf> = Vec::new();
        if let Some(rx) = self.open_rx.as_mut() {
            while let Ok(path) = rx.try_recv() {
                received.push(path);
            }
        }
        for path in received {
            self.apply(Action::OpenPath(path))?;
        }
        Ok(())
    }

    /// Execute one line.
    pub fn execute(&mut self, line: &str) -> Result<ReplFlow, AppError> {
        let app: &AppState = &self.app;
        let command: ReplCommand =
            ReplCommand::parse(line, |token: &str| app.resolve_target(token).is_some());
        let before: PathBuf = self.app.cwd().to_path_buf();

        match command {
            ReplCommand::Empty => {}
            ReplCommand::List => {
                self.app.pane.refresh();
                self.print_listing()?;
            }
            ReplCommand::Cd(target) => {
                let action: Action = match target.as_deref() {
                    None => Action::Home,
                    Some("-") => Action::Back,
                    Some("..") => Action::Parent,
                    Some(token) => match self.target(token) {
                        Some(path) if path.is_dir() => Action::ChangeDirectory(path),
                        Some(path) => Action::OpenWith(path),
                        None => Action::GoTo(token.to_string()),
                    },
                };
                self.apply(action)?;
            }
            ReplCommand::Parent => self.apply(Action::Parent)?,
            ReplCommand::Back => self.apply(Action::HistoryBack)?,
            ReplCommand::History => self.print_history()?,
            ReplCommand::Open(token) | ReplCommand::Implicit(token) => match self.target(&token) {
                Some(path) if path.is_dir() => self.apply(Action::ChangeDirectory(path))?,
                Some(path) => self.apply(Action::OpenWith(path))?,
                None => self.no_such(&token)?,
            },
            ReplCommand::Edit(token) => match self.target(&token) {
                Some(path) => self.apply(Action::EditPath(path))?,
                None => self.no_such(&token)?,
            },
            ReplCommand::Touch(name) => self.apply(Action::CreateFile(name))?,
            ReplCommand::Mkdir(name) => self.apply(Action::CreateDirectory(name))?,
            ReplCommand::Mv { target, new_name } => match self.target(&target) {
                Some(source) => self.apply(Action::Rename { source, new_name })?,
                None => self.no_such(&target)?,
            },
            ReplCommand::Rm(tokens) => self.remove(&tokens)?,
            ReplCommand::Select(tokens) => {
                for token in tokens {
                    let index: Option<usize> = self.target(&token).and_then(|path: PathBuf| {
                        self.app.pane.entries.iter().position(|e| e.path == path)
                    });
                    match index {
                        Some(index) => self.apply(Action::ToggleIndex(index))?,
                        None => self.no_such(&token)?,
                    }
                }
            }
            ReplCommand::Unselect => self.apply(Action::ClearSelection)?,
            ReplCommand::Yank(operation, tokens) if tokens.is_empty() => {
                self.apply(Action::Yank(operation))?
            }
            ReplCommand::Yank(operation, tokens) => {
                if let Some(paths) = self.targets(&tokens)? {
                    self.apply(Action::YankPaths(operation, paths))?;
                }
            }
            ReplCommand::Paste => self.apply(Action::Paste)?,
            ReplCommand::Link => self.apply(Action::Link)?,
            ReplCommand::Unclip => self.apply(Action::Unclip)?,
            ReplCommand::Clip => self.print_clipboard()?,
            ReplCommand::Find(pattern) => {
                self.apply(Action::Find(pattern))?;
                self.print_cursor()?;
            }
            ReplCommand::Next => {
                self.apply(Action::FindNext)?;
                self.print_cursor()?;
            }
            ReplCommand::Prev => {
                self.apply(Action::FindPrevious)?;
                self.print_cursor()?;
            }
            ReplCommand::Filter(pattern) => {
                self.apply(Action::SetFilter(pattern))?;
                self.print_listing()?;
            }
            ReplCommand::Hidden => {
                self.apply(Action::ToggleHidden)?;
                self.print_listing()?;
            }
            ReplCommand::Chmod => self.apply(Action::ToggleExecutable)?,
            ReplCommand::Mark(name) => self.apply(Action::Mark(name))?,
            ReplCommand::Marks => self.print_marks()?,
            ReplCommand::Go(name) => self.apply(Action::GoMark(name))?,
            ReplCommand::Unmark(name) => self.apply(Action::Unmark(name))?,
            ReplCommand::Help => self.print_help()?,
            ReplCommand::Quit => return Ok(ReplFlow::Quit),
            ReplCommand::Shell(command) => self.apply(Action::ShellCommand(command))?,
            ReplCommand::Usage(usage) => writeln!(self.output, "usage: {usage}")?,
        }

        if self.app.cwd() != before {
            self.print_listing()?;
        }
        Ok(ReplFlow::Continue)
    }

    /// Dispatch, run any requested program in the foreground and print the
    /// resulting message.
    fn apply(&mut self, action: Action) -> Result<(), AppError> {
        if let Effect::Spawn(request) = dispatch(&mut self.app, action) {
            self.output.flush()?;
            let result = process_operator::run(&request, &self.app.config.programs);
            complete_process(&mut self.app, &request, result);
        }
        if let Some(notification) = self.app.ui.take_notification() {
            writeln!(self.output, "{}", notification.message)?;
        }
        Ok(())
    }

    fn remove(&mut self, tokens: &[String]) -> Result<(), AppError> {
        let paths: Vec<PathBuf> = if tokens.is_empty() {
            self.app.pane.target_set()
        } else {
            match self.targets(tokens)? {
                Some(paths) => paths,
                None => return Ok(()),
            }
        };
        if paths.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = paths
            .iter()
            .map(|p: &PathBuf| {
                p.file_name()
                    .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
            })
            .collect();
        write!(self.output, "rm {}? [y/N] ", names.join(" "))?;
        self.output.flush()?;

        let answer: Option<String> = self.read_line()?;
        if answer.as_deref().map(str::trim) == Some("y") {
            self.apply(Action::DeletePaths(paths))?;
        }
        Ok(())
    }

    fn target(&self, token: &str) -> Option<PathBuf> {
        self.app.resolve_target(token)
    }

    /// Resolve every token or report the first that does not resolve.
    fn targets(&mut self, tokens: &[String]) -> Result<Option<Vec<PathBuf>>, AppError> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.target(token) {
                Some(path) => paths.push(path),
                None => {
                    self.no_such(token)?;
                    return Ok(None);
                }
            }
        }
        Ok(Some(paths))
    }

    fn no_such(&mut self, token: &str) -> Result<(), AppError> {
        writeln!(self.output, "no such target: {token}")?;
        Ok(())
    }

    fn print_listing(&mut self) -> Result<(), AppError> {
        let pane = &self.app.pane;
        if pane.entries.is_empty() {
            writeln!(self.output, "  (empty)")?;
        }
        for (index, entry) in pane.entries.iter().enumerate() {
            let marker: char = if pane.is_selected(entry) { '+' } else { ' ' };
            writeln!(
                self.output,
                "{marker}{:>3}  {}{}",
                index + 1,
                entry.name,
                entry.indicator()
            )?;
        }
        Ok(())
    }

    fn print_cursor(&mut self) -> Result<(), AppError> {
        if let Some(entry) = self.app.pane.current_entry() {
            writeln!(self.output, "{:>4}  {}", self.app.pane.cursor + 1, entry.name)?;
        }
        Ok(())
    }

    fn print_history(&mut self) -> Result<(), AppError> {
        let home = self.app.home.as_deref();
        for (index, path) in self.app.history.entries().enumerate() {
            writeln!(
                self.output,
                "{:>4}  {}",
                index + 1,
                crate::util::paths::tilde(path, home)
            )?;
        }
        Ok(())
    }

    fn print_clipboard(&mut self) -> Result<(), AppError> {
        if self.app.clipboard.is_empty() {
            writeln!(self.output, "clipboard is empty")?;
            return Ok(());
        }
        writeln!(
            self.output,
            "{}: {}",
            self.app.clipboard.operation().tag(),
            self.app.clipboard.len()
        )?;
        for path in self.app.clipboard.paths() {
            writeln!(self.output, "  {}", path.display())?;
        }
        Ok(())
    }

    fn print_marks(&mut self) -> Result<(), AppError> {
        let marks: Vec<Mark> = match self.app.marks() {
            Ok(store) => store.list(),
            Err(e) => {
                writeln!(self.output, "{e}")?;
                return Ok(());
            }
        };
        for mark in marks {
            let target: String = mark
                .target
                .map_or_else(|| "?".to_string(), |t: PathBuf| t.display().to_string());
            writeln!(self.output, "  {} -> {target}", mark.name)?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> Result<(), AppError> {
        for (usage, description) in COMMANDS {
            writeln!(self.output, "  {usage:<20} {description}")?;
        }
        writeln!(
            self.output,
            "  anything else: open an existing path or index, or run it in the shell"
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(line: &str) -> ReplCommand {
        ReplCommand::parse(line, |t| t == "3" || t == "notes.txt")
    }

    fn repl_in(root: &Path, input: &str) -> Repl<Cursor<Vec<u8>>, Vec<u8>> {
        let work = root.join("work");
        fs::create_dir_all(&work).unwrap();
        let mut config = Config::default();
        config.paths.marks_dir = root.join("cfg/marks");
        config.paths.history_file = root.join("cfg/history");
        let app = AppState::new(config, work).unwrap();
        Repl::new(app, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn output(repl: Repl<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(repl.into_parts().1).unwrap()
    }

    #[test]
    fn test_parse_command_table() {
        assert_eq!(parse("ls"), ReplCommand::List);
        assert_eq!(parse("  cd  "), ReplCommand::Cd(None));
        assert_eq!(parse("cd -"), ReplCommand::Cd(Some("-".into())));
        assert_eq!(parse(".."), ReplCommand::Parent);
        assert_eq!(parse("touch my file"), ReplCommand::Touch("my file".into()));
        assert_eq!(
            parse("mv 2 new name"),
            ReplCommand::Mv {
                target: "2".into(),
                new_name: "new name".into()
            }
        );
        assert_eq!(parse("mv 2"), ReplCommand::Usage("mv <target> <new>"));
        assert_eq!(
            parse("cut 1 2"),
            ReplCommand::Yank(ClipboardOperation::Move, vec!["1".into(), "2".into()])
        );
        assert_eq!(parse("filter"), ReplCommand::Filter(None));
        assert_eq!(parse("exit"), ReplCommand::Quit);
        assert_eq!(parse(""), ReplCommand::Empty);
    }

    #[test]
    fn test_parse_implicit_open_and_shell_fallback() {
        assert_eq!(parse("3"), ReplCommand::Implicit("3".into()));
        assert_eq!(parse("notes.txt"), ReplCommand::Implicit("notes.txt".into()));
        assert_eq!(parse("make all"), ReplCommand::Shell("make all".into()));
        assert_eq!(parse("!ls -l"), ReplCommand::Shell("ls -l".into()));
        assert_eq!(parse("!3"), ReplCommand::Shell("3".into()));
    }

    #[test]
    fn test_implicit_open_resolves_the_whole_line() {
        let resolves = |token: &str| token == "my notes.txt";
        assert_eq!(
            ReplCommand::parse("  my notes.txt ", resolves),
            ReplCommand::Implicit("my notes.txt".into())
        );
        assert_eq!(
            ReplCommand::parse("my other.txt", resolves),
            ReplCommand::Shell("my other.txt".into())
        );
    }

    #[test]
    fn test_rm_asks_and_only_y_deletes() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), "n\ny\n");
        fs::write(repl.app().cwd().join("a"), b"a").unwrap();
        fs::write(repl.app().cwd().join("b"), b"b").unwrap();
        repl.execute("ls").unwrap();

        repl.execute("rm 1").unwrap();
        assert!(repl.app().cwd().join("a").exists());

        repl.execute("rm 1").unwrap();
        assert!(!repl.app().cwd().join("a").exists());
        assert!(repl.app().cwd().join("b").exists());

        let out = output(repl);
        assert_eq!(out.matches("rm a? [y/N]").count(), 2);
    }

    #[test]
    fn test_cd_prints_listing_and_back_returns() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), "");
        let work = repl.app().cwd().to_path_buf();
        fs::create_dir(work.join("inner")).unwrap();
        fs::write(work.join("inner/file.txt"), b"x").unwrap();

        repl.execute("cd inner").unwrap();
        assert_eq!(repl.app().cwd(), work.join("inner"));
        repl.execute("back").unwrap();
        assert_eq!(repl.app().cwd(), work.as_path());
        repl.execute("cd ..").unwrap();
        assert_eq!(repl.app().cwd(), tmp.path());

        let out = output(repl);
        assert!(out.contains("  1  file.txt"));
    }

    #[test]
    fn test_clipboard_commands() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), "");
        let work = repl.app().cwd().to_path_buf();
        fs::create_dir(work.join("dest")).unwrap();
        fs::write(work.join("f.txt"), b"f").unwrap();

        repl.execute("cut f.txt").unwrap();
        repl.execute("clip").unwrap();
        repl.execute("cd dest").unwrap();
        repl.execute("paste").unwrap();
        repl.execute("paste").unwrap();

        assert!(work.join("dest/f.txt").exists());
        assert!(!work.join("f.txt").exists());
        let out = output(repl);
        assert!(out.contains("cut: 1"));
        assert!(out.contains("clipboard is empty"));
    }

    #[test]
    fn test_unknown_target_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), "");

        repl.execute("edit ghost").unwrap();
        repl.execute("mv ghost other").unwrap();

        let out = output(repl);
        assert_eq!(out.matches("no such target: ghost").count(), 2);
    }

    #[test]
    fn test_run_stops_at_quit() {
        let tmp = TempDir::new().unwrap();
        let mut repl = repl_in(tmp.path(), "mkdir made\nquit\ntouch never\n");

        repl.run().unwrap();

        assert!(repl.app().cwd().join("made").is_dir());
        assert!(!repl.app().cwd().join("never").exists());
    }
}
