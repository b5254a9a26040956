//! src/model/app_state.rs
//! ============================================================================
//! # AppState: everything the engine owns
//!
//! One value holds the pane, the modal UI state, the clipboard, the marks and
//! history stores and the configuration it was built from. The marks and
//! history stores are optional: when either cannot be opened at startup the
//! feature is disabled and a single warning is shown.

use std::fs;
use std::path::{Path, PathBuf};

use pi_clip::Clipboard;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::model::fs_state::PaneState;
use crate::model::history::{HistoryStore, NavigationHistory};
use crate::model::marks::MarksStore;
use crate::model::ui_state::UIState;
use crate::util::paths;

#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub pane: PaneState,
    pub ui: UIState,
    pub clipboard: Clipboard,
    pub marks: Option<MarksStore>,
    pub history: NavigationHistory,
    pub history_store: Option<HistoryStore>,
    pub home: Option<PathBuf>,
}

impl AppState {
    /// Build the engine rooted at `start_dir`, which must be a directory.
    #[instrument(level = "info", skip(config))]
    pub fn new(config: Config, start_dir: PathBuf) -> Result<Self, AppError> {
        let start_dir: PathBuf = paths::normalize(&start_dir);
        if !start_dir.is_dir() {
            return Err(AppError::navigation_failed(start_dir, "not a directory"));
        }

        let mut warnings: Vec<String> = Vec::new();

        let marks: Option<MarksStore> = match MarksStore::open(config.paths.marks_dir.clone()) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(
                    marker = "MARKS_UNAVAILABLE",
                    operation_type = "startup",
                    error = %e,
                    "Marks disabled"
                );
                warnings.push(AppError::Unavailable("marks").to_string());
                None
            }
        };

        let mut history: NavigationHistory = NavigationHistory::new(config.history_max);
        let history_store: Option<HistoryStore> =
            match HistoryStore::open(config.paths.history_file.clone(), config.history_max)
                .and_then(|store: HistoryStore| store.load().map(|seed| (store, seed)))
            {
                Ok((store, seed)) => {
                    history.seed(seed);
                    Some(store)
                }
                Err(e) => {
                    warn!(
                        marker = "HISTORY_UNAVAILABLE",
                        operation_type = "startup",
                        error = %e,
                        "History disabled"
                    );
                    warnings.push(AppError::Unavailable("history").to_string());
                    None
                }
            };

        let pane: PaneState = PaneState::new(start_dir.clone(), config.show_hidden);
        let mut state: AppState = Self {
            config,
            pane,
            ui: UIState::new(),
            clipboard: Clipboard::new(),
            marks,
            history,
            history_store,
            home: paths::home_dir(),
        };
        state.remember(&start_dir);

        if !warnings.is_empty() {
            state.ui.show_warning(warnings.join("; "));
        }

        info!(
            marker = "APP_STATE_READY",
            operation_type = "startup",
            cwd = %start_dir.display(),
            entries_count = state.pane.entries.len(),
            "Engine initialized"
        );
        Ok(state)
    }

    pub fn cwd(&self) -> &Path {
        &self.pane.cwd
    }

    /// Current directory with the home directory shown as `~`.
    pub fn display_cwd(&self) -> String {
        paths::tilde(&self.pane.cwd, self.home.as_deref())
    }

    pub fn marks(&self) -> Result<&MarksStore, AppError> {
        self.marks.as_ref().ok_or(AppError::Unavailable("marks"))
    }

    /// Move to `dir`, recording history. Refuses anything but a directory.
    pub fn change_directory(&mut self, dir: &Path) -> Result<(), AppError> {
        let dir: PathBuf = paths::normalize(dir);
        if !dir.is_dir() {
            return Err(AppError::navigation_failed(dir, "not a directory"));
        }
        if fs::read_dir(&dir).is_err() {
            return Err(AppError::navigation_failed(dir, "permission denied"));
        }

        let from: PathBuf = self.pane.cwd.clone();
        self.history.record(&from, &dir);
        self.remember(&dir);
        self.pane.set_cwd(dir);

        info!(
            marker = "DIRECTORY_CHANGED",
            operation_type = "navigation",
            from = %from.display(),
            to = %self.pane.cwd.display(),
            entries_count = self.pane.entries.len(),
            "Directory changed"
        );
        Ok(())
    }

    fn remember(&mut self, dir: &Path) {
        self.history.visit(dir);
        if let Some(store) = &self.history_store
            && let Err(e) = store.add(dir)
        {
            warn!(
                marker = "HISTORY_WRITE_FAILED",
                operation_type = "navigation",
                error = %e,
                "Failed to persist history"
            );
        }
    }

    /// Resolve a command-line token: a 1-based listing index, or a path
    /// relative to the current directory that exists on disk.
    pub fn resolve_target(&self, token: &str) -> Option<PathBuf> {
        let token: &str = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(index) = token.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i: usize| self.pane.entries.get(i))
                .map(|entry| entry.path.clone());
        }
        let path: PathBuf = paths::resolve_input(token, &self.pane.cwd, self.home.as_deref());
        fs::symlink_metadata(&path).is_ok().then_some(path)
    }

    /// Resolve free-form path input without requiring it to exist.
    pub fn resolve_input(&self, input: &str) -> PathBuf {
        paths::resolve_input(input, &self.pane.cwd, self.home.as_deref())
    }
}
