//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Manages all user-editable settings for pi. Loads and saves settings as TOML
//! from the XDG config path found with [`directories`](https://docs.rs/directories).
//! The loaded value is handed to the engine at construction; nothing reads
//! configuration from globals.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let app = AppState::new(config, start_dir)?;
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::AppError;
use crate::logging::{LogRotation, LoggerConfig};

const APP_NAME: &str = "pi";
const DEFAULT_SOCKET: &str = "/tmp/pi.sock";

/// External programs, each a command line split on whitespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProgramsConfig {
    pub editor: String,
    pub opener: String,
    pub shell: String,
    pub fuzzy_finder: String,
    pub fuzzy_open: String,
    pub fuzzy_edit: String,
    pub version_control: String,
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            editor: "edit".to_string(),
            opener: "open".to_string(),
            shell: std::env::var("SHELL").unwrap_or_else(|_| "sh".to_string()),
            fuzzy_finder: "fzy".to_string(),
            fuzzy_open: "fzopen".to_string(),
            fuzzy_edit: "fzedit".to_string(),
            version_control: "v".to_string(),
        }
    }
}

/// Filesystem locations used by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub marks_dir: PathBuf,
    pub history_file: PathBuf,
    pub socket: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let (config_dir, data_dir): (PathBuf, PathBuf) = match project_dirs() {
            Some(dirs) => (
                dirs.config_dir().to_path_buf(),
                dirs.data_dir().to_path_buf(),
            ),
            None => (PathBuf::from(".pi"), PathBuf::from(".pi")),
        };

        Self {
            marks_dir: config_dir.join("marks"),
            history_file: config_dir.join("history"),
            socket: PathBuf::from(DEFAULT_SOCKET),
            log_dir: data_dir.join("logs"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: CompactString,
    pub rotation: LogRotation,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompactString::const_new("info"),
            rotation: LogRotation::Daily,
            max_files: 5,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub show_hidden: bool,

    /// Re-list the current directory on every idle tick.
    pub auto_refresh: bool,

    #[serde(with = "humantime_serde")]
    pub tick: Duration,

    pub history_max: usize,

    /// How long a liveness probe waits for a running instance.
    #[serde(with = "humantime_serde")]
    pub probe_timeout: Duration,

    pub programs: ProgramsConfig,

    pub paths: PathsConfig,

    /// Single printable key -> operation name, merged over the defaults.
    pub bindings: BTreeMap<String, String>,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_hidden: false,
            auto_refresh: true,
            tick: Duration::from_secs(1),
            history_max: 1000,
            probe_timeout: Duration::from_secs(1),
            programs: ProgramsConfig::default(),
            paths: PathsConfig::default(),
            bindings: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Loads config from the XDG config dir, writing the defaults there first
    /// if no file exists yet.
    pub async fn load() -> Result<Self, AppError> {
        let path: PathBuf = Self::config_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        if TokioFs::try_exists(path).await.unwrap_or(false) {
            info!(
                marker = "CONFIG_LOAD",
                operation_type = "config",
                path = %path.display(),
                "Loading config"
            );
            let text: String =
                TokioFs::read_to_string(path)
                    .await
                    .map_err(|source| AppError::ConfigIo {
                        path: path.to_path_buf(),
                        source,
                    })?;
            Self::from_toml_str(&text)
        } else {
            info!(
                marker = "CONFIG_CREATE_DEFAULT",
                operation_type = "config",
                path = %path.display(),
                "No config file found, writing defaults"
            );
            let default_config = Self::default();
            default_config.save_to(path).await?;
            Ok(default_config)
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let io_err = |source: std::io::Error| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let toml_str: String = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await.map_err(io_err)?;
        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, AppError> {
        let proj_dirs: ProjectDirs = project_dirs()
            .ok_or_else(|| AppError::Other("Could not determine config directory".into()))?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            log_dir: self.paths.log_dir.clone(),
            log_level: self.logging.level.clone(),
            max_log_files: self.logging.max_files,
            rotation: self.logging.rotation,
            ..LoggerConfig::default()
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}
