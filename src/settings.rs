use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};

/// Overrides the configuration directory (used by tests and portable installs).
pub const HOME_ENV: &str = "LEDGERDESK_HOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_uri")]
    pub base_uri: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_uri() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            log_level: default_log_level(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("ledgerdesk")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn storage_path() -> PathBuf {
    config_dir().join("storage.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("ledgerdesk.log")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DeskError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

impl Settings {
    /// The API root without a trailing slash, so paths can be appended directly.
    pub fn api_root(&self) -> &str {
        self.base_uri.trim_end_matches('/')
    }
}
