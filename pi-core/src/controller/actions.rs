//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Engine Commands
//!
//! Defines the `Action` enum, which represents every command the engine can
//! apply. Both front ends translate their input (single keys or command
//! lines) into `Action`s and hand them to
//! [`dispatch`](crate::controller::action_dispatcher::dispatch), which
//! answers with an [`Effect`] for the front end to carry out.

use std::path::PathBuf;

use pi_clip::ClipboardOperation;

use crate::operators::process_operator::ProcessRequest;

/// Type of input prompt to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    CreateFile,
    CreateDirectory,
    /// Rename the captured path.
    Rename(PathBuf),
    GoTo,
    Search,
    /// Empty input clears the filter.
    Filter,
    /// Empty input uses the directory basename.
    Mark,
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateFile => "new file",
            Self::CreateDirectory => "new dir",
            Self::Rename(_) => "rename",
            Self::GoTo => "goto",
            Self::Search => "search",
            Self::Filter => "filter",
            Self::Mark => "mark",
        }
    }
}

/// Represents a high-level command the engine can perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Cursor
    MoveBy(isize),
    PageUp,
    PageDown,
    SelectFirst,
    SelectLast,
    /// 0-based listing index.
    JumpTo(usize),

    // Navigation
    /// Enter the cursor directory or open the cursor file.
    Enter,
    /// Go to the parent, highlighting the directory just left.
    Parent,
    /// Swap with the previous directory.
    Back,
    /// Most recent history entry other than the current directory.
    HistoryBack,
    Home,
    ChangeDirectory(PathBuf),
    /// Free-form path: directories are entered, files are opened.
    GoTo(String),
    /// Enter the marks directory and start a search.
    GoToMarks,
    GoMark(String),
    /// Directory: enter it. File: enter its parent and select it.
    Reveal(PathBuf),
    /// A path sent by a second invocation.
    OpenPath(PathBuf),
    Refresh,

    // Listing
    ToggleHidden,
    SetFilter(Option<String>),
    /// Clear the filter when one is set.
    ClearFilter,
    Find(String),
    FindNext,
    FindPrevious,

    // Selection
    ToggleSelection,
    /// 0-based listing index.
    ToggleIndex(usize),
    ClearSelection,

    // Structural
    CreateFile(String),
    CreateDirectory(String),
    Rename { source: PathBuf, new_name: String },
    /// Ask for confirmation before deleting the target set.
    RequestDelete,
    /// Delete without asking; the caller already confirmed.
    DeletePaths(Vec<PathBuf>),
    ToggleExecutable,

    // Clipboard
    /// Yank the target set.
    Yank(ClipboardOperation),
    YankPaths(ClipboardOperation, Vec<PathBuf>),
    Paste,
    Link,
    Unclip,

    // Marks
    Mark(Option<String>),
    Unmark(String),

    // External programs
    /// Edit the files of the target set.
    Edit,
    EditPath(PathBuf),
    OpenWith(PathBuf),
    FuzzyOpen,
    FuzzyEdit,
    Shell,
    ShellCommand(String),
    VersionControl,
    /// Pick a history entry with the fuzzy finder.
    PickHistory,

    // Modal input
    BeginPrompt(PromptKind),
    /// Start a rename prompt for the cursor entry.
    BeginRename,
    PromptInput(char),
    PromptBackspace,
    SubmitPrompt,
    CancelPrompt,
    Confirm(bool),
    DigitInput(char),
    CommitJump,
    CancelJump,
    ToggleHelp,

    /// Quit the application.
    Quit,

    /// No operation. Used when an event is consumed but no state change is needed.
    NoOp,
}

impl Action {
    /// Whether the action changes what is on disk.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::CreateFile(_)
                | Self::CreateDirectory(_)
                | Self::Rename { .. }
                | Self::DeletePaths(_)
                | Self::ToggleExecutable
                | Self::Paste
                | Self::Link
        )
    }
}

/// What the front end must do after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    /// Hand the terminal to an external program, then report back with
    /// [`complete_process`](crate::controller::action_dispatcher::complete_process).
    Spawn(ProcessRequest),
    Quit,
}
