//! Switcher settings with JSON persistence
//!
//! Holds the server location, the credential source and the manager window
//! geometry. Every field has a default so a partial (or missing) file still
//! loads.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{cookie, defaults, http};

/// Top-level settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub credential: CredentialSettings,
    #[serde(default)]
    pub window: WindowSettings,
    /// Options offered when the catalog cannot be fetched
    #[serde(default)]
    pub configs: Vec<String>,
}

/// Where switch requests go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_select_path")]
    pub select_path: String,
    /// Full catalog URL; `{base_url}/v1/rails/configs` when unset
    #[serde(default)]
    pub configs_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Where the bearer token comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSettings {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Cookie file in `name=value; name2=value2` form, re-read on every switch
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub width: u16,
    #[serde(default = "default_window_height")]
    pub height: u16,
}

fn default_base_url() -> String {
    defaults::server::BASE_URL.to_string()
}

fn default_select_path() -> String {
    http::SELECT_PATH.to_string()
}

fn default_request_timeout_secs() -> u64 {
    defaults::server::REQUEST_TIMEOUT_SECS
}

fn default_cookie_name() -> String {
    cookie::PROXY.to_string()
}

fn default_window_width() -> u16 {
    defaults::manager::WINDOW_WIDTH
}

fn default_window_height() -> u16 {
    defaults::manager::WINDOW_HEIGHT
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            select_path: default_select_path(),
            configs_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            cookie_file: None,
        }
    }
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Catalog URL, derived from the base URL unless configured explicitly
    pub fn configs_url(&self) -> String {
        match &self.configs_url {
            Some(url) => url.clone(),
            None => format!(
                "{}{}",
                self.base_url.trim_end_matches('/'),
                http::CONFIGS_PATH
            ),
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load settings from `path`, falling back to defaults when the file is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = ?path, "Settings file not found, using defaults");
            return Ok(Settings::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        info!(
            path = ?path,
            base_url = %settings.server.base_url,
            "Loaded settings"
        );
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json_string =
            serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;

        fs::write(path, json_string)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
