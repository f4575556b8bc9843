use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::api::client::DEFAULT_BASE_URL;
use crate::error::ConfigError;
use crate::history::HistoryPolicy;
use crate::templates::MessageTemplates;

pub const API_URL_ENV: &str = "RAGCHAT_API_URL";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_policy: Option<String>,
    /// Seconds a finished upload status stays visible; `null` or 0 keeps it
    pub status_clear_secs: Option<u64>,
    pub messages: MessageTemplates,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            history_policy: None,
            status_clear_secs: Some(5),
            messages: MessageTemplates::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Base URL: explicit override, then `RAGCHAT_API_URL`, then the config
    /// file, then the local development backend.
    pub fn resolve_api_url(&self, flag: Option<&str>) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        pick_api_url(flag, env.as_deref(), self.api_url.as_deref())
    }

    pub fn history_policy(&self) -> HistoryPolicy {
        match self.history_policy.as_deref() {
            None => HistoryPolicy::default(),
            Some(name) => HistoryPolicy::from_str(name).unwrap_or_else(|| {
                warn!(policy = name, "Unknown history policy, using default");
                HistoryPolicy::default()
            }),
        }
    }

    pub fn status_clear_after(&self) -> Option<Duration> {
        self.status_clear_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("ragchat").join("config.json"))
    }
}

fn pick_api_url(flag: Option<&str>, env: Option<&str>, configured: Option<&str>) -> String {
    [flag, env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}
