//! Help overlay listing every key binding in effect
use crate::view::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

pub struct HelpOverlay;

impl HelpOverlay {
    /// `lines` are (keys, description) pairs in display order.
    pub fn render(frame: &mut Frame<'_>, lines: &[(String, &'static str)], area: Rect) {
        let key_width: usize = lines
            .iter()
            .map(|(keys, _)| keys.chars().count())
            .max()
            .unwrap_or(0);

        let mut text: Vec<Line> = lines
            .iter()
            .map(|(keys, description)| {
                Line::from(vec![
                    Span::styled(format!("  {keys:<key_width$}  "), theme::help_key_style()),
                    Span::raw(*description),
                ])
            })
            .collect();
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            "  digits: jump to entry    any key: close",
            theme::base_style().fg(theme::COMMENT),
        )));

        let width: u16 = (key_width + 40).min(usize::from(area.width)) as u16;
        let height: u16 = (text.len() + 2).min(usize::from(area.height)) as u16;
        let overlay_area: Rect = centered(area, width, height);
        frame.render_widget(Clear, overlay_area);

        let paragraph = Paragraph::new(Text::from(text))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" pi help ")
                    .title_alignment(Alignment::Center)
                    .border_style(theme::base_style().fg(theme::CYAN))
                    .style(theme::base_style()),
            )
            .style(theme::base_style());

        frame.render_widget(paragraph, overlay_area);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [vertical] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horizontal] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vertical);
    horizontal
}
