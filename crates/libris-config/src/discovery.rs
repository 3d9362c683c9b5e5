//! Well-known directories.
//!
//! Everything lives under one config directory:
//! - `client.yaml`: environment overrides
//! - `session/`: persisted token and user profile
//! - `logs/`: rolling JSON logs written by the CLI

use std::path::PathBuf;

/// Environment variable to override the config directory.
///
/// When set, this takes precedence over the platform default (XDG/Application Support).
const CONFIG_DIR_ENV: &str = "LIBRIS_CONFIG_DIR";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "libris";

/// Get the XDG config directory for libris.
///
/// Checks `LIBRIS_CONFIG_DIR` env var first, then falls back to platform default.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Directory holding the persisted session.
pub fn session_dir() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join("session"))
}

/// Directory for log files.
pub fn log_dir() -> PathBuf {
    xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
