//! Configuration paths
//!
//! The config file location can be overridden with `RESTPROBE_CONFIG`;
//! otherwise the platform config directory is used.

use std::path::PathBuf;

/// Application name used for platform directories
const APP_NAME: &str = "restprobe";

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV: &str = "RESTPROBE_CONFIG";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/restprobe/`
/// - macOS: `~/Library/Application Support/restprobe/`
/// - Windows: `%APPDATA%\restprobe\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV) {
        if !explicit.is_empty() {
            return Some(PathBuf::from(explicit));
        }
    }
    config_dir().map(|dir| dir.join("config.toml"))
}
