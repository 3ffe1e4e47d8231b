use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::record::DisplayOptions;

pub const CONFIG_FILE_NAME: &str = "talento_config.json";
pub const DEFAULT_COLLECTION: &str = "notifications";
const DEFAULT_TOAST_DISMISS_SECS: u64 = 3;
// Brasília (no DST).
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Optional knobs read from `<data_dir>/talento_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collection: Option<String>,
    pub optimistic_removal: Option<bool>,
    pub toast_dismiss_secs: Option<u64>,
    pub display_utc_offset_minutes: Option<i32>,
    pub empty_message_placeholder: Option<String>,
    pub missing_timestamp_label: Option<String>,
}

impl AppConfig {
    /// Collection name: config file, then `TALENTO_COLLECTION`, then the default.
    pub fn collection(&self) -> String {
        if let Some(c) = self.collection.as_deref().map(str::trim) {
            if !c.is_empty() {
                return c.to_string();
            }
        }
        if let Ok(c) = std::env::var("TALENTO_COLLECTION") {
            let c = c.trim();
            if !c.is_empty() {
                return c.to_string();
            }
        }
        DEFAULT_COLLECTION.to_string()
    }

    pub fn optimistic_removal(&self) -> bool {
        self.optimistic_removal.unwrap_or(true)
    }

    pub fn toast_dismiss_secs(&self) -> u64 {
        self.toast_dismiss_secs.unwrap_or(DEFAULT_TOAST_DISMISS_SECS)
    }

    pub fn display_options(&self) -> DisplayOptions {
        let defaults = DisplayOptions::default();
        DisplayOptions {
            utc_offset_minutes: self
                .display_utc_offset_minutes
                .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES),
            empty_message_placeholder: self
                .empty_message_placeholder
                .clone()
                .unwrap_or(defaults.empty_message_placeholder),
            missing_timestamp_label: self
                .missing_timestamp_label
                .clone()
                .unwrap_or(defaults.missing_timestamp_label),
        }
    }
}

pub fn config_path(data_dir: &str) -> PathBuf {
    Path::new(data_dir).join(CONFIG_FILE_NAME)
}

/// Strict read; a missing file is `Ok(None)`.
pub fn read_app_config(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Lenient load used by the core: any problem falls back to defaults.
pub fn load_app_config(data_dir: &str) -> AppConfig {
    let path = config_path(data_dir);
    match read_app_config(&path) {
        Ok(Some(cfg)) => cfg,
        Ok(None) => AppConfig::default(),
        Err(e) => {
            tracing::warn!(%e, "invalid app config, using defaults");
            AppConfig::default()
        }
    }
}
