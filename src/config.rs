use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::conversation::DEFAULT_MAX_MESSAGES;
use crate::timeline::Locale;

// Default configuration
pub const DEFAULT_ENDPOINT: &str = "wss://api.drivup.app/socket";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Real-time socket endpoint
    pub endpoint: String,
    /// Id of the signed-in passenger or driver
    pub user_id: String,
    /// Language of day separators
    pub locale: Locale,
    /// Messages kept per conversation before the oldest are trimmed
    pub max_buffer_messages: usize,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_id: String::new(),
            locale: Locale::default(),
            max_buffer_messages: DEFAULT_MAX_MESSAGES,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("app", "drivup", "drivup-chat")?;
    let dir = proj.config_dir();
    if let Err(e) = fs::create_dir_all(dir) {
        tracing::warn!(error = %e, "failed to create config dir");
        return None;
    }
    Some(dir.join("settings.json"))
}

/// Load settings from the platform config dir. Missing or unreadable files
/// yield `None`; the caller decides whether defaults are acceptable.
pub fn load_settings() -> Option<Settings> {
    let path = settings_path()?;
    match load_settings_from(&path) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no usable settings file");
            None
        }
    }
}

pub fn load_settings_from(path: &Path) -> Result<Settings, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid settings file: {}", e))
}

pub fn save_settings(settings: &Settings) -> Result<(), String> {
    let path = settings_path().ok_or("Failed to determine config directory")?;
    save_settings_to(settings, &path)
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), String> {
    let data = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;
    let mut file = fs::File::create(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    file.write_all(data.as_bytes())
        .map_err(|e| format!("Failed to write settings: {}", e))
}
