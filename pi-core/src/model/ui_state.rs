//! src/model/ui_state.rs
//! ============================================================================
//! # UIState: modal input state and transient status messages
//!
//! The engine is in exactly one of three modes. Prompt text and the numeric
//! jump prefix live here so that an abort can drop them without touching the
//! listing.

use std::path::PathBuf;
use std::time::Instant;

use compact_str::CompactString;

use crate::controller::actions::PromptKind;

/// Engine modes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UIMode {
    #[default]
    Browsing,

    /// Collecting a line of text for `PromptKind`.
    Prompting(PromptKind),

    /// Waiting for `y` to delete the listed paths.
    Confirming(Vec<PathBuf>),
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotificationLevel {
    Info = 0,
    Success = 1,
    Warning = 2,
    Error = 3,
}

/// Compact notification with timestamp
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: CompactString,
    pub level: NotificationLevel,
    pub timestamp: Instant,
    pub auto_dismiss_ms: u32,
}

#[derive(Debug, Clone, Default)]
pub struct UIState {
    pub mode: UIMode,

    /// Prompt line being edited.
    pub input: CompactString,

    /// Digits typed so far for a numeric jump.
    pub jump_buffer: Option<CompactString>,

    pub notification: Option<Notification>,

    pub show_help: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_browsing(&self) -> bool {
        self.mode == UIMode::Browsing
    }

    /// Enter `Prompting`, pre-filling the line with `initial`.
    pub fn begin_prompt(&mut self, kind: PromptKind, initial: impl Into<CompactString>) {
        self.input = initial.into();
        self.jump_buffer = None;
        self.mode = UIMode::Prompting(kind);
    }

    /// Leave `Prompting`, handing back its kind and the typed line.
    pub fn take_prompt(&mut self) -> Option<(PromptKind, CompactString)> {
        match std::mem::take(&mut self.mode) {
            UIMode::Prompting(kind) => Some((kind, std::mem::take(&mut self.input))),
            other => {
                self.mode = other;
                None
            }
        }
    }

    pub fn begin_confirm(&mut self, paths: Vec<PathBuf>) {
        self.jump_buffer = None;
        self.mode = UIMode::Confirming(paths);
    }

    /// Leave `Confirming`, handing back the paths awaiting confirmation.
    pub fn take_confirm(&mut self) -> Option<Vec<PathBuf>> {
        match std::mem::take(&mut self.mode) {
            UIMode::Confirming(paths) => Some(paths),
            other => {
                self.mode = other;
                None
            }
        }
    }

    /// Drop any pending prompt, confirmation or jump prefix.
    pub fn abort(&mut self) {
        self.mode = UIMode::Browsing;
        self.input.clear();
        self.jump_buffer = None;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn delete_char_before(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn push_digit(&mut self, digit: char) {
        self.jump_buffer
            .get_or_insert_with(CompactString::default)
            .push(digit);
    }

    /// Consume the jump prefix as a 1-based index.
    pub fn take_jump(&mut self) -> Option<usize> {
        self.jump_buffer.take()?.parse::<usize>().ok()
    }

    // Notification system with inline helpers
    pub fn show_notification(
        &mut self,
        message: impl Into<CompactString>,
        level: NotificationLevel,
        auto_dismiss_ms: u32,
    ) {
        self.notification = Some(Notification {
            message: message.into(),
            level,
            timestamp: Instant::now(),
            auto_dismiss_ms,
        });
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Info, 3000);
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Success, 2000);
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Warning, 5000);
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<CompactString>) {
        self.show_notification(message, NotificationLevel::Error, 8000);
    }

    /// Drop an expired notification; true when one was dropped.
    pub fn update_notification(&mut self) -> bool {
        if let Some(notification) = &self.notification
            && notification.timestamp.elapsed().as_millis() > u128::from(notification.auto_dismiss_ms)
        {
            self.notification = None;
            return true;
        }
        false
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }
}
