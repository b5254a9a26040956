//! ``src/view/components/prompt_bar.rs``
//! ============================================================================
//! # `PromptBar`: single-line input in the status row
//!
//! Shows the prompt label followed by the text typed so far and places the
//! terminal cursor after it.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::view::theme;

pub struct PromptBar;

impl PromptBar {
    pub fn render(frame: &mut Frame<'_>, label: &str, input: &str, area: Rect) {
        let label: String = format!("{label}: ");
        let cursor_x: u16 = area
            .x
            .saturating_add((label.chars().count() + input.chars().count()) as u16)
            .min(area.right().saturating_sub(1));

        let line = Line::from(vec![
            Span::styled(label, theme::prompt_label_style()),
            Span::raw(input.to_string()),
        ]);
        frame.render_widget(Paragraph::new(line).style(theme::base_style()), area);
        frame.set_cursor_position(Position::new(cursor_x, area.y));
    }
}
