//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the whole screen from the engine
//! state: the listing with its title, the status row and, on
//! top, the help overlay.

use std::io::Stdout;

use ratatui::{Terminal, backend::CrosstermBackend, prelude::*};
use tracing::instrument;

use crate::model::app_state::AppState;
use crate::view::components::{
    help_overlay::HelpOverlay, object_table::ObjectTable, status_bar::StatusBar,
};

pub type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

pub struct UIRenderer {
    help_lines: Vec<(String, &'static str)>,
    frames: u64,
}

impl UIRenderer {
    /// `help_lines` are the key bindings shown by the help overlay.
    pub fn new(help_lines: Vec<(String, &'static str)>) -> Self {
        Self {
            help_lines,
            frames: 0,
        }
    }

    #[instrument(level = "trace", skip_all, fields(frame = self.frames))]
    pub fn render(&mut self, f: &mut Frame<'_>, app: &AppState) {
        let [listing, status] = layout(f.area());

        ObjectTable::render(f, app, listing);
        StatusBar::render(f, app, status);

        if app.ui.show_help {
            HelpOverlay::render(f, &self.help_lines, f.area());
        }
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Listing area and status row.
pub fn layout(screen: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(screen)
}

/// Rows available to the listing on a screen of `screen` size.
pub fn listing_height(screen: Rect) -> usize {
    let [listing, _] = layout(screen);
    usize::from(listing.height.saturating_sub(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::controller::handlers::keyboard_handler::KeyboardHandler;
    use ratatui::backend::TestBackend;
    use std::fs;
    use tempfile::TempDir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_listing_is_numbered_with_indicators() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(work.join("sub")).unwrap();
        fs::write(work.join("notes.txt"), b"n").unwrap();
        let mut config = Config::default();
        config.paths.marks_dir = tmp.path().join("cfg/marks");
        config.paths.history_file = tmp.path().join("cfg/history");
        let app = AppState::new(config, work).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut renderer = UIRenderer::new(KeyboardHandler::default().help_lines());
        terminal.draw(|f| renderer.render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains(".."));
        assert!(lines[2].contains("1 sub/"));
        assert!(lines[3].contains("2 notes.txt"));
        assert!(text.contains("1/2"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_parent_row_is_highlighted_when_cursor_rests_on_it() {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(work.join("only.txt"), b"o").unwrap();
        let mut config = Config::default();
        config.paths.marks_dir = tmp.path().join("cfg/marks");
        config.paths.history_file = tmp.path().join("cfg/history");
        let mut app = AppState::new(config, work).unwrap();
        app.pane.move_by(-1);

        let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
        let mut renderer = UIRenderer::new(KeyboardHandler::default().help_lines());
        terminal.draw(|f| renderer.render(f, &app)).unwrap();

        let text = screen_text(&terminal);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("▶"));
        assert!(lines[1].contains(".."));
        assert!(!lines[2].contains("▶"));
        assert!(text.contains("0/1"));
    }

    #[test]
    fn test_listing_height_excludes_borders_and_status() {
        assert_eq!(listing_height(Rect::new(0, 0, 80, 24)), 21);
        assert_eq!(listing_height(Rect::new(0, 0, 80, 2)), 0);
    }
}
