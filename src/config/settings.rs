//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data. The log file
//! location is an ordinary configuration value: a command-line override
//! wins, then the settings file, then the platform default. Nothing in the
//! storage layer reaches for these paths on its own — they are resolved
//! here and injected.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global paths singleton.
static PATHS: OnceLock<Paths> = OnceLock::new();

/// Application directory paths following the XDG Base Directory
/// Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/reportlog)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/reportlog)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Get the global paths instance.
    pub fn get() -> &'static Paths {
        PATHS.get_or_init(|| Self::new().expect("Failed to initialize paths"))
    }

    /// Initialize paths using XDG directories.
    ///
    /// Directories are not created here; the storage and settings layers
    /// create what they need when they first write.
    fn new() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("com", "reportlog", "reportlog").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the default path of the report log: `data/dataset.jsonl`
    /// under the data directory.
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join("data").join("dataset.jsonl")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Log file location override. `None` means the platform default.
    pub data_file: Option<PathBuf>,
    /// Enable verbose output by default.
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            data_file: None,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = Paths::get();
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        let paths = Paths::get();
        let file = paths.settings_file();

        fs::create_dir_all(&paths.config_dir)?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        fs::write(&file, content).map_err(|e| ConfigError::WriteFailed {
            path: file,
            reason: e.to_string(),
        })
    }

    /// Resolve the log file path: explicit override first, then the
    /// settings value, then the platform default.
    pub fn resolve_data_file(&self, override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path {
            return path.to_path_buf();
        }
        if let Some(path) = &self.data_file {
            return path.clone();
        }
        Paths::get().data_file()
    }
}
