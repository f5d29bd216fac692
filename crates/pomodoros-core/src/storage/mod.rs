mod config;

pub use config::{Config, PreferencesConfig, TimerConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomodoros[-dev]/` based on POMODOROS_ENV.
///
/// Set POMODOROS_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMODOROS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomodoros-dev")
    } else {
        base_dir.join("pomodoros")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
    Ok(dir)
}
