use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "metaads";
const APP_CONFIG_FILE: &str = "config.json";
const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

/// Base directories for `metaads` files: `$XDG_CONFIG_HOME`, else `$HOME/.config`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDirs {
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl ConfigDirs {
    pub fn new(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            xdg_config_home: xdg_config_home.filter(|path| !path.as_os_str().is_empty()),
            home,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        )
    }

    /// Path of `file_name` inside the `metaads` config directory.
    pub fn app_file(&self, file_name: &str) -> Result<PathBuf, ConfigPathError> {
        let root = match (&self.xdg_config_home, &self.home) {
            (Some(xdg), _) => xdg.clone(),
            (None, Some(home)) => home.join(".config"),
            (None, None) => return Err(ConfigPathError::MissingHomeDirectory),
        };
        Ok(root.join(APP_DIR).join(file_name))
    }
}

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Overrides where the theme preference is persisted.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl AppConfig {
    /// Reads `config.json`; a missing, unreadable or malformed file yields defaults.
    pub fn load_from(dirs: &ConfigDirs) -> Self {
        let Ok(path) = dirs.app_file(APP_CONFIG_FILE) else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        read_config_file(&path).unwrap_or_default()
    }

    /// File holding the persisted theme preference.
    pub fn preference_path(&self, dirs: &ConfigDirs) -> Result<PathBuf, ConfigPathError> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => dirs.app_file(PREFERENCES_FILE),
        }
    }
}

fn read_config_file(path: &Path) -> Option<AppConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|err| {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
        })
        .ok()?;
    serde_json::from_str(&contents)
        .map_err(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
        })
        .ok()
}
