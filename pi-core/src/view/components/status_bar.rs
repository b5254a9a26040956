//! src/view/components/status_bar.rs
//!
//! The bottom row. In priority order it shows the delete confirmation, the
//! active prompt, the numeric jump being typed, the current notification,
//! or the cursor position with a help hint.

use std::path::{Path, PathBuf};

use ratatui::{
    prelude::*,
    widgets::{Paragraph, Widget},
};

use crate::controller::actions::PromptKind;
use crate::model::app_state::AppState;
use crate::model::ui_state::UIMode;
use crate::view::components::prompt_bar::PromptBar;
use crate::view::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let ui = &app.ui;

        match &ui.mode {
            UIMode::Prompting(kind) => {
                PromptBar::render(frame, &prompt_label(kind, app.cwd()), &ui.input, area);
                return;
            }
            UIMode::Confirming(paths) => {
                Paragraph::new(confirm_text(paths))
                    .style(theme::notification_style(
                        crate::model::ui_state::NotificationLevel::Warning,
                    ))
                    .render(area, frame.buffer_mut());
                return;
            }
            UIMode::Browsing => {}
        }

        if let Some(digits) = &ui.jump_buffer {
            Paragraph::new(format!(":{digits}"))
                .style(theme::base_style())
                .render(area, frame.buffer_mut());
            return;
        }

        let [left, right] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(24)]).areas(area);

        match &ui.notification {
            Some(notification) => Paragraph::new(notification.message.as_str())
                .style(theme::notification_style(notification.level))
                .render(left, frame.buffer_mut()),
            None => Paragraph::new(filter_text(app))
                .style(theme::base_style().fg(theme::COMMENT))
                .render(left, frame.buffer_mut()),
        }

        let position: String = format!("{}/{}", app.pane.view_row(), app.pane.entries.len());
        Paragraph::new(format!("{position}  ? help"))
            .style(theme::base_style().fg(theme::COMMENT))
            .alignment(Alignment::Right)
            .render(right, frame.buffer_mut());
    }
}

/// Prompt label; the mark prompt names the default mark.
pub fn prompt_label(kind: &PromptKind, cwd: &Path) -> String {
    match kind {
        PromptKind::Mark => {
            let default: String = cwd
                .file_name()
                .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().into_owned());
            format!("mark [{default}]")
        }
        other => other.label().to_string(),
    }
}

pub fn confirm_text(paths: &[PathBuf]) -> String {
    let names: Vec<String> = paths
        .iter()
        .map(|p: &PathBuf| {
            p.file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned())
        })
        .collect();
    format!("rm {}? y/N", names.join(" "))
}

fn filter_text(app: &AppState) -> String {
    match &app.pane.filter {
        Some(filter) => format!("filter: {filter}"),
        None => String::new(),
    }
}
