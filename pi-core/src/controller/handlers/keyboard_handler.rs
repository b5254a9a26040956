// pi-core/src/controller/handlers/keyboard_handler.rs
// Single-key bindings for the modal keyboard UI

use std::collections::{BTreeMap, HashMap};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pi_clip::ClipboardOperation;
use tracing::{debug, warn};

use crate::controller::actions::{Action, PromptKind};
use crate::model::ui_state::{UIMode, UIState};

/// Operations a key can be bound to. The names are what `[bindings]` in the
/// config file refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    NewFile,
    NewDirectory,
    Copy,
    Cut,
    Paste,
    Link,
    Unclip,
    Toggle,
    Delete,
    Rename,
    Edit,
    GoTo,
    Search,
    FindNext,
    FindPrevious,
    Filter,
    Hidden,
    Chmod,
    Mark,
    Marks,
    Home,
    FuzzyOpen,
    FuzzyEdit,
    History,
    Shell,
    VersionControl,
    Help,
    Quit,
    Down,
    Up,
    Open,
    Parent,
    Back,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Refresh,
}

impl Binding {
    pub const ALL: [Binding; 38] = [
        Self::Up,
        Self::Down,
        Self::Open,
        Self::Parent,
        Self::Back,
        Self::PageUp,
        Self::PageDown,
        Self::Top,
        Self::Bottom,
        Self::GoTo,
        Self::Home,
        Self::Marks,
        Self::Mark,
        Self::History,
        Self::Search,
        Self::FindNext,
        Self::FindPrevious,
        Self::Filter,
        Self::Hidden,
        Self::Toggle,
        Self::NewFile,
        Self::NewDirectory,
        Self::Rename,
        Self::Delete,
        Self::Chmod,
        Self::Copy,
        Self::Cut,
        Self::Paste,
        Self::Link,
        Self::Unclip,
        Self::Edit,
        Self::FuzzyOpen,
        Self::FuzzyEdit,
        Self::Shell,
        Self::VersionControl,
        Self::Refresh,
        Self::Help,
        Self::Quit,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::NewFile => "new_file",
            Self::NewDirectory => "new_dir",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::Link => "link",
            Self::Unclip => "unclip",
            Self::Toggle => "toggle",
            Self::Delete => "delete",
            Self::Rename => "rename",
            Self::Edit => "edit",
            Self::GoTo => "goto",
            Self::Search => "search",
            Self::FindNext => "next",
            Self::FindPrevious => "prev",
            Self::Filter => "filter",
            Self::Hidden => "hidden",
            Self::Chmod => "chmod",
            Self::Mark => "mark",
            Self::Marks => "marks",
            Self::Home => "home",
            Self::FuzzyOpen => "fuzzy_open",
            Self::FuzzyEdit => "fuzzy_edit",
            Self::History => "history",
            Self::Shell => "shell",
            Self::VersionControl => "vcs",
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Down => "down",
            Self::Up => "up",
            Self::Open => "open",
            Self::Parent => "parent",
            Self::Back => "back",
            Self::PageUp => "page_up",
            Self::PageDown => "page_down",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Refresh => "refresh",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b: &Binding| b.name() == name)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::NewFile => "new file",
            Self::NewDirectory => "new directory",
            Self::Copy => "yank for copy",
            Self::Cut => "yank for move",
            Self::Paste => "paste clipboard here",
            Self::Link => "link clipboard here",
            Self::Unclip => "empty clipboard",
            Self::Toggle => "toggle selection",
            Self::Delete => "delete",
            Self::Rename => "rename",
            Self::Edit => "edit",
            Self::GoTo => "go to path",
            Self::Search => "search",
            Self::FindNext => "next match",
            Self::FindPrevious => "previous match",
            Self::Filter => "filter listing",
            Self::Hidden => "toggle hidden files",
            Self::Chmod => "toggle executable",
            Self::Mark => "mark directory",
            Self::Marks => "browse marks",
            Self::Home => "home directory",
            Self::FuzzyOpen => "fuzzy open",
            Self::FuzzyEdit => "fuzzy edit",
            Self::History => "pick from history",
            Self::Shell => "shell",
            Self::VersionControl => "version control",
            Self::Help => "help",
            Self::Quit => "quit",
            Self::Down => "down",
            Self::Up => "up",
            Self::Open => "open",
            Self::Parent => "parent directory",
            Self::Back => "previous directory",
            Self::PageUp => "page up",
            Self::PageDown => "page down",
            Self::Top => "first entry",
            Self::Bottom => "last entry",
            Self::Refresh => "refresh",
        }
    }

    pub fn to_action(self) -> Action {
        match self {
            Self::NewFile => Action::BeginPrompt(PromptKind::CreateFile),
            Self::NewDirectory => Action::BeginPrompt(PromptKind::CreateDirectory),
            Self::Copy => Action::Yank(ClipboardOperation::Copy),
            Self::Cut => Action::Yank(ClipboardOperation::Move),
            Self::Paste => Action::Paste,
            Self::Link => Action::Link,
            Self::Unclip => Action::Unclip,
            Self::Toggle => Action::ToggleSelection,
            Self::Delete => Action::RequestDelete,
            Self::Rename => Action::BeginRename,
            Self::Edit => Action::Edit,
            Self::GoTo => Action::BeginPrompt(PromptKind::GoTo),
            Self::Search => Action::BeginPrompt(PromptKind::Search),
            Self::FindNext => Action::FindNext,
            Self::FindPrevious => Action::FindPrevious,
            Self::Filter => Action::BeginPrompt(PromptKind::Filter),
            Self::Hidden => Action::ToggleHidden,
            Self::Chmod => Action::ToggleExecutable,
            Self::Mark => Action::BeginPrompt(PromptKind::Mark),
            Self::Marks => Action::GoToMarks,
            Self::Home => Action::Home,
            Self::FuzzyOpen => Action::FuzzyOpen,
            Self::FuzzyEdit => Action::FuzzyEdit,
            Self::History => Action::PickHistory,
            Self::Shell => Action::Shell,
            Self::VersionControl => Action::VersionControl,
            Self::Help => Action::ToggleHelp,
            Self::Quit => Action::Quit,
            Self::Down => Action::MoveBy(1),
            Self::Up => Action::MoveBy(-1),
            Self::Open => Action::Enter,
            Self::Parent => Action::Parent,
            Self::Back => Action::Back,
            Self::PageUp => Action::PageUp,
            Self::PageDown => Action::PageDown,
            Self::Top => Action::SelectFirst,
            Self::Bottom => Action::SelectLast,
            Self::Refresh => Action::Refresh,
        }
    }
}

type KeyId = (KeyCode, KeyModifiers);

/// Translates key events into actions according to the current mode.
#[derive(Debug, Clone)]
pub struct KeyboardHandler {
    bindings: HashMap<KeyId, Binding>,
}

impl Default for KeyboardHandler {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl KeyboardHandler {
    /// Default bindings with `overrides` (single printable key -> binding
    /// name) merged on top. Invalid overrides are logged and skipped.
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut bindings: HashMap<KeyId, Binding> = HashMap::with_capacity(64);

        for (ch, binding) in [
            ('a', Binding::NewFile),
            ('A', Binding::NewDirectory),
            ('c', Binding::Copy),
            ('x', Binding::Cut),
            ('p', Binding::Paste),
            ('l', Binding::Link),
            ('u', Binding::Unclip),
            ('t', Binding::Toggle),
            (' ', Binding::Toggle),
            ('d', Binding::Delete),
            ('r', Binding::Rename),
            ('e', Binding::Edit),
            ('g', Binding::GoTo),
            ('/', Binding::Search),
            ('n', Binding::FindNext),
            ('N', Binding::FindPrevious),
            ('!', Binding::Filter),
            ('.', Binding::Hidden),
            ('*', Binding::Chmod),
            ('m', Binding::Mark),
            ('`', Binding::Marks),
            ('~', Binding::Home),
            ('o', Binding::FuzzyOpen),
            ('z', Binding::FuzzyEdit),
            ('b', Binding::History),
            ('s', Binding::Shell),
            ('v', Binding::VersionControl),
            ('h', Binding::Help),
            ('?', Binding::Help),
            ('q', Binding::Quit),
            ('j', Binding::Down),
            ('k', Binding::Up),
        ] {
            bindings.insert(key(ch), binding);
        }

        for (code, binding) in [
            (KeyCode::Down, Binding::Down),
            (KeyCode::Up, Binding::Up),
            (KeyCode::Enter, Binding::Open),
            (KeyCode::Right, Binding::Open),
            (KeyCode::Left, Binding::Parent),
            (KeyCode::Backspace, Binding::Parent),
            (KeyCode::Tab, Binding::Back),
            (KeyCode::PageUp, Binding::PageUp),
            (KeyCode::PageDown, Binding::PageDown),
            (KeyCode::Home, Binding::Top),
            (KeyCode::End, Binding::Bottom),
            (KeyCode::Delete, Binding::Delete),
            (function_key(5), Binding::Refresh),
        ] {
            bindings.insert((code, KeyModifiers::NONE), binding);
        }

        for (key_text, name) in overrides {
            let mut chars = key_text.chars();
            let ch: Option<char> = match (chars.next(), chars.next()) {
                (Some(ch), None) if !ch.is_control() && !ch.is_ascii_digit() => Some(ch),
                _ => None,
            };
            match (ch, Binding::from_name(name)) {
                (Some(ch), Some(binding)) => {
                    bindings.insert(key(ch), binding);
                }
                _ => warn!(
                    marker = "KEY_BINDING_INVALID",
                    operation_type = "config",
                    key = %key_text,
                    binding = %name,
                    "Ignoring invalid key binding"
                ),
            }
        }

        Self { bindings }
    }

    /// Translate `key_event` in the context of the current mode.
    pub fn handle(&self, key_event: KeyEvent, ui: &UIState) -> Action {
        let (code, modifiers): KeyId = normalize(key_event);

        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Action::Quit;
        }
        if ui.show_help {
            return Action::ToggleHelp;
        }

        let action: Action = match &ui.mode {
            UIMode::Prompting(_) => match code {
                KeyCode::Esc | KeyCode::Down => Action::CancelPrompt,
                KeyCode::Enter => Action::SubmitPrompt,
                KeyCode::Backspace => Action::PromptBackspace,
                KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    Action::PromptInput(ch)
                }
                _ => Action::NoOp,
            },
            UIMode::Confirming(_) => Action::Confirm(code == KeyCode::Char('y')),
            UIMode::Browsing if ui.jump_buffer.is_some() => match code {
                KeyCode::Char(ch) if ch.is_ascii_digit() => Action::DigitInput(ch),
                KeyCode::Esc => Action::CancelJump,
                _ => Action::CommitJump,
            },
            UIMode::Browsing => match code {
                KeyCode::Char(ch) if ch.is_ascii_digit() && modifiers.is_empty() => {
                    Action::DigitInput(ch)
                }
                KeyCode::Esc => Action::ClearFilter,
                _ => self
                    .bindings
                    .get(&(code, modifiers))
                    .map_or(Action::NoOp, |b: &Binding| b.to_action()),
            },
        };

        debug!(
            marker = "KEY_TRANSLATED",
            operation_type = "input_handling",
            key = ?code,
            action = ?action,
            "Key translated"
        );
        action
    }

    /// Key labels per binding, in help order.
    pub fn help_lines(&self) -> Vec<(String, &'static str)> {
        Binding::ALL
            .into_iter()
            .filter_map(|binding: Binding| {
                let mut keys: Vec<String> = self
                    .bindings
                    .iter()
                    .filter(|(_, b)| **b == binding)
                    .map(|((code, _), _)| key_label(*code))
                    .collect();
                if keys.is_empty() {
                    return None;
                }
                keys.sort();
                Some((keys.join(" "), binding.description()))
            })
            .collect()
    }
}

fn key(ch: char) -> KeyId {
    (KeyCode::Char(ch), KeyModifiers::NONE)
}

fn function_key(n: u8) -> KeyCode {
    KeyCode::F(n)
}

/// Terminals disagree on whether shifted characters carry SHIFT.
fn normalize(key_event: KeyEvent) -> KeyId {
    let mut modifiers: KeyModifiers = key_event.modifiers;
    if matches!(key_event.code, KeyCode::Char(_)) {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    (key_event.code, modifiers)
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::PageUp => "PgUp".to_string(),
        KeyCode::PageDown => "PgDn".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ch(c: char) -> KeyEvent {
        press(KeyCode::Char(c))
    }

    #[test]
    fn test_default_bindings() {
        let handler = KeyboardHandler::default();
        let ui = UIState::new();

        assert_eq!(handler.handle(ch('x'), &ui), Action::Yank(ClipboardOperation::Move));
        assert_eq!(handler.handle(ch('d'), &ui), Action::RequestDelete);
        assert_eq!(handler.handle(press(KeyCode::Tab), &ui), Action::Back);
        assert_eq!(handler.handle(press(KeyCode::F(5)), &ui), Action::Refresh);
        assert_eq!(handler.handle(press(KeyCode::Esc), &ui), Action::ClearFilter);
        assert_eq!(handler.handle(ch('Y'), &ui), Action::NoOp);
    }

    #[test]
    fn test_shifted_letters_match_with_or_without_shift() {
        let handler = KeyboardHandler::default();
        let ui = UIState::new();
        let shifted = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);

        assert_eq!(
            handler.handle(shifted, &ui),
            Action::BeginPrompt(PromptKind::CreateDirectory)
        );
        assert_eq!(handler.handle(ch('N'), &ui), Action::FindPrevious);
    }

    #[test]
    fn test_ctrl_c_quits_in_every_mode() {
        let handler = KeyboardHandler::default();
        let mut ui = UIState::new();
        ui.begin_prompt(PromptKind::GoTo, "");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(handler.handle(ctrl_c, &ui), Action::Quit);
    }

    #[test]
    fn test_prompt_mode_keys() {
        let handler = KeyboardHandler::default();
        let mut ui = UIState::new();
        ui.begin_prompt(PromptKind::Search, "");

        assert_eq!(handler.handle(ch('q'), &ui), Action::PromptInput('q'));
        assert_eq!(handler.handle(press(KeyCode::Enter), &ui), Action::SubmitPrompt);
        assert_eq!(handler.handle(press(KeyCode::Down), &ui), Action::CancelPrompt);
        assert_eq!(handler.handle(press(KeyCode::Esc), &ui), Action::CancelPrompt);
    }

    #[test]
    fn test_confirm_accepts_only_y() {
        let handler = KeyboardHandler::default();
        let mut ui = UIState::new();
        ui.begin_confirm(vec![PathBuf::from("/tmp/x")]);

        assert_eq!(handler.handle(ch('y'), &ui), Action::Confirm(true));
        assert_eq!(handler.handle(ch('Y'), &ui), Action::Confirm(false));
        assert_eq!(handler.handle(ch('n'), &ui), Action::Confirm(false));
        assert_eq!(handler.handle(press(KeyCode::Enter), &ui), Action::Confirm(false));
    }

    #[test]
    fn test_digits_start_and_terminate_a_jump() {
        let handler = KeyboardHandler::default();
        let mut ui = UIState::new();

        assert_eq!(handler.handle(ch('4'), &ui), Action::DigitInput('4'));
        ui.push_digit('4');
        assert_eq!(handler.handle(ch('2'), &ui), Action::DigitInput('2'));
        assert_eq!(handler.handle(ch('j'), &ui), Action::CommitJump);
        assert_eq!(handler.handle(press(KeyCode::Enter), &ui), Action::CommitJump);
        assert_eq!(handler.handle(press(KeyCode::Esc), &ui), Action::CancelJump);
    }

    #[test]
    fn test_help_overlay_swallows_any_key() {
        let handler = KeyboardHandler::default();
        let mut ui = UIState::new();
        ui.show_help = true;

        assert_eq!(handler.handle(ch('d'), &ui), Action::ToggleHelp);
    }

    #[test]
    fn test_config_overrides_printable_keys() {
        let mut overrides = BTreeMap::new();
        overrides.insert("E".to_string(), "edit".to_string());
        overrides.insert("q".to_string(), "help".to_string());
        overrides.insert("5".to_string(), "quit".to_string());
        overrides.insert("w".to_string(), "no_such_binding".to_string());
        let handler = KeyboardHandler::new(&overrides);
        let ui = UIState::new();

        assert_eq!(handler.handle(ch('E'), &ui), Action::Edit);
        assert_eq!(handler.handle(ch('q'), &ui), Action::ToggleHelp);
        assert_eq!(handler.handle(ch('5'), &ui), Action::DigitInput('5'));
        assert_eq!(handler.handle(ch('w'), &ui), Action::NoOp);
    }

    #[test]
    fn test_help_lines_list_every_bound_operation() {
        let handler = KeyboardHandler::default();
        let lines = handler.help_lines();

        assert_eq!(lines.len(), Binding::ALL.len());
        assert!(lines.contains(&("Delete d".to_string(), "delete")));
        assert!(lines.contains(&("Space t".to_string(), "toggle selection")));
    }

    #[test]
    fn test_binding_names_round_trip() {
        for binding in Binding::ALL {
            assert_eq!(Binding::from_name(binding.name()), Some(binding));
        }
    }
}
