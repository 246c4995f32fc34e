//! Configuration management
//!
//! Settings live in `settings.json` inside the wallet directory:
//! ```json
//! {
//!   "apiBaseUrl": "http://localhost:5000/api",
//!   "requestTimeoutSecs": 30,
//!   "offline": false,
//!   "persist": { "key": "root", "whitelist": ["auth", "transactions", "app"], "debounceMs": 250 }
//! }
//! ```
//! Keys this crate doesn't know about are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::adapters::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::domain::result::{Error, Result};
use crate::store::persist::{PersistConfig, Slice, DEFAULT_DEBOUNCE, DEFAULT_ROOT_KEY};

pub const SETTINGS_FILE: &str = "settings.json";

/// Overrides `apiBaseUrl`
pub const API_URL_ENV: &str = "POCKET_WALLET_API_URL";

/// Forces offline mode (for CI/testing)
pub const OFFLINE_ENV: &str = "POCKET_WALLET_OFFLINE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    offline: bool,
    #[serde(default)]
    persist: PersistSettings,
    #[serde(flatten)]
    other: HashMap<String, JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    whitelist: Option<Vec<Slice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    debounce_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, JsonValue>,
}

/// Wallet configuration (resolved view of settings plus environment)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub offline: bool,
    pub persist: PersistConfig,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            offline: false,
            persist: PersistConfig::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the wallet directory
    ///
    /// `POCKET_WALLET_API_URL` and `POCKET_WALLET_OFFLINE` take precedence
    /// over the file. An unreadable settings file yields the defaults.
    pub fn load(wallet_dir: &Path) -> Result<Self> {
        Self::load_with_env(wallet_dir, |name| std::env::var(name).ok())
    }

    /// [`Config::load`] with an explicit environment lookup
    pub fn load_with_env(wallet_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let settings_path = wallet_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let api_base_url = env(API_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .or_else(|| raw.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let offline = parse_flag(env(OFFLINE_ENV).as_deref()).unwrap_or(raw.offline);

        let request_timeout = match raw.request_timeout_secs {
            Some(0) => {
                return Err(Error::Config(
                    "requestTimeoutSecs must be greater than zero".to_string(),
                ))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        let persist = PersistConfig {
            key: raw
                .persist
                .key
                .clone()
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| DEFAULT_ROOT_KEY.to_string()),
            whitelist: raw
                .persist
                .whitelist
                .clone()
                .unwrap_or_else(|| Slice::ALL.to_vec()),
            debounce: raw
                .persist
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE),
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            offline,
            persist,
            _raw_settings: raw,
        })
    }

    /// Change the backend URL; only absolute http(s) URLs are accepted
    pub fn set_api_base_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!("API URL must use http or https: {}", url)));
        }
        self.api_base_url = url.to_string();
        Ok(())
    }

    /// Save config to the wallet directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, wallet_dir: &Path) -> Result<()> {
        let settings_path = wallet_dir.join(SETTINGS_FILE);

        // Load existing settings to preserve fields we don't manage
        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content)
                .unwrap_or_else(|_| self._raw_settings.clone())
        } else {
            self._raw_settings.clone()
        };

        settings.api_base_url = Some(self.api_base_url.clone());
        settings.request_timeout_secs = Some(self.request_timeout.as_secs());
        settings.offline = self.offline;
        settings.persist.key = Some(self.persist.key.clone());
        settings.persist.whitelist = Some(self.persist.whitelist.clone());
        settings.persist.debounce_ms = Some(self.persist.debounce.as_millis() as u64);

        std::fs::create_dir_all(wallet_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}
