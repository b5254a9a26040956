//! src/view/components/object_table.rs
//! ============================================================================
//! # ObjectTable: the numbered listing
//!
//! A fixed `..` row for the parent comes first, then one row per entry: the
//! 1-based index used by numeric jumps and the name with its kind indicator.
//! The cursor row stays centered while the rows outnumber the viewport; the
//! bottom border counts rows out of view.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, Table, TableState},
};

use crate::fs::object_info::Entry;
use crate::model::app_state::AppState;
use crate::view::theme;

/// Label of the parent row.
pub const PARENT_ROW: &str = "..";

pub struct ObjectTable;

impl ObjectTable {
    pub fn render(frame: &mut Frame<'_>, app: &AppState, area: Rect) {
        let pane = &app.pane;
        let height: usize = usize::from(area.height.saturating_sub(2));
        let row_count: usize = pane.entries.len() + 1;
        let offset: usize = scroll_offset(pane.view_row(), height, row_count);

        let parent: Row = Row::new(vec![
            Cell::from(""),
            Cell::from(PARENT_ROW).style(theme::base_style().fg(theme::CYAN)),
        ]);
        let rows: Vec<Row> = std::iter::once(parent)
            .chain(
                pane.entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry): (usize, &Entry)| {
                        let mut name_style: Style = theme::entry_style(entry);
                        if pane.is_selected(entry) {
                            name_style = name_style.patch(theme::selected_style());
                        }
                        Row::new(vec![
                            Cell::from(format!("{:>3}", index + 1)).style(theme::index_style()),
                            Cell::from(format!("{}{}", entry.name, entry.indicator()))
                                .style(name_style),
                        ])
                    }),
            )
            .collect();

        let widths = [Constraint::Length(3), Constraint::Fill(1)];

        let mut block: Block = Block::default()
            .borders(Borders::ALL)
            .title(pane_title(app))
            .title_style(theme::title_style())
            .border_style(theme::border_style())
            .style(theme::base_style());

        let hidden: usize = row_count.saturating_sub(height);
        if hidden > 0 {
            block = block.title_bottom(Line::from(format!(" +{hidden} ")).right_aligned());
        }

        let mut table_state: TableState = TableState::default()
            .with_offset(offset)
            .with_selected(Some(pane.view_row()));

        let table = Table::new(rows, widths)
            .block(block)
            .row_highlight_style(theme::cursor_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

/// Directory with `~` for home, the selection size and the clipboard state.
pub fn pane_title(app: &AppState) -> String {
    let mut title: String = format!(" {}", app.display_cwd());
    if !app.pane.selection.is_empty() {
        title.push_str(&format!(" [{}]", app.pane.selection.len()));
    }
    if !app.clipboard.is_empty() {
        title.push_str(&format!(
            " {}:{}",
            app.clipboard.operation().tag(),
            app.clipboard.len()
        ));
    }
    title.push(' ');
    title
}

/// First visible row that keeps `cursor` centered in `height` rows.
pub fn scroll_offset(cursor: usize, height: usize, len: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    cursor
        .saturating_sub(height / 2)
        .min(len - height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_centers_and_clamps() {
        assert_eq!(scroll_offset(3, 10, 5), 0);
        assert_eq!(scroll_offset(2, 10, 100), 0);
        assert_eq!(scroll_offset(50, 10, 100), 45);
        assert_eq!(scroll_offset(99, 10, 100), 90);
        assert_eq!(scroll_offset(7, 0, 100), 0);
    }
}
