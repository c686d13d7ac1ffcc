//! Configuration file handling
//!
//! Settings are layered: built-in defaults, then the TOML config file,
//! then `.env` / process environment, then command-line flags (applied by
//! the CLI through [`Config::override_base_url`] and friends).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::paths::config_path;
use super::{Error, Result};

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "RESTPROBE_TIMEOUT_SECS";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Config {
    /// Target API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Runner behaviour
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Extra or overriding named payloads
    #[serde(default)]
    pub fixtures: BTreeMap<String, Value>,
}

/// Target API settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// Base URL every scenario path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Headers sent with every request, on top of the JSON defaults
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            headers: BTreeMap::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Runner behaviour
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct RunnerConfig {
    /// Treat an unexpectedly passing xfail case as a failure
    #[serde(default)]
    pub strict_xfail: bool,

    /// Stop a suite at its first failing case
    #[serde(default)]
    pub fail_fast: bool,
}

impl Config {
    /// Load configuration, preferring an explicit file over the default one
    ///
    /// An explicit file must exist; the default file is optional and
    /// defaults are used when it is absent.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!(base_url = %config.api.base_url, "configuration loaded");
        Ok(config)
    }

    /// Load configuration from an explicit TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.api.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    Error::Config(format!(
                        "{TIMEOUT_ENV} must be a positive number of seconds, got '{raw}'"
                    ))
                })?;
        }
        Ok(())
    }

    /// Replace the base URL (command-line flag)
    pub fn override_base_url(&mut self, url: Option<String>) {
        if let Some(url) = url {
            self.api.base_url = url;
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Internal(e.to_string()))
    }
}
