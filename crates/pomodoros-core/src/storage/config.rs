//! TOML-based application configuration.
//!
//! Stores:
//! - Volume preferences read by the audio layer
//! - Timer tick interval
//! - Task definitions a host can start sessions from
//!
//! Configuration is stored at `~/.config/pomodoros/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::session::TaskConfig;
use crate::timer::{DEFAULT_TICK_INTERVAL_MS, MIN_TICK_INTERVAL_MS};

/// User preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Alarm volume, 0-100. Zero turns alarms into a haptic pulse.
    #[serde(default = "default_volume")]
    pub alarm_volume: u32,
    /// Ambient loop volume, 0-100.
    #[serde(default = "default_volume")]
    pub background_volume: u32,
    #[serde(default)]
    pub distraction_free: bool,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pomodoros/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preferences: PreferencesConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default = "default_tasks")]
    pub tasks: Vec<TaskConfig>,
}

fn default_volume() -> u32 {
    100
}
fn default_language() -> String {
    "en".into()
}
fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
fn default_tasks() -> Vec<TaskConfig> {
    vec![TaskConfig::new("Pomodoro")]
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            alarm_volume: default_volume(),
            background_volume: default_volume(),
            distraction_free: false,
            language: default_language(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferences: PreferencesConfig::default(),
            timer: TimerConfig::default(),
            tasks: default_tasks(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, or the value does not fit the
    /// key's type or range. The config is left unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values that parse but cannot drive a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick interval is below
    /// [`MIN_TICK_INTERVAL_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: format!(
                    "{} is below the minimum of {MIN_TICK_INTERVAL_MS} ms",
                    self.timer.tick_interval_ms
                ),
            });
        }
        Ok(())
    }

    /// Find a task by name, ignoring case.
    pub fn task(&self, name: &str) -> Option<&TaskConfig> {
        self.tasks
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.preferences.alarm_volume, 100);
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
        assert_eq!(parsed.tasks, cfg.tasks);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("preferences.alarm_volume").as_deref(), Some("100"));
        assert_eq!(cfg.get("preferences.language").as_deref(), Some("en"));
        assert!(cfg.get("preferences.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set("preferences.background_volume", "35").unwrap();
        assert_eq!(cfg.preferences.background_volume, 35);
    }

    #[test]
    fn set_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.set("preferences.distraction_free", "true").unwrap();
        assert!(cfg.preferences.distraction_free);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("preferences.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.tick_interval_ms", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn set_rejects_tick_interval_below_minimum() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.tick_interval_ms", "0"),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "timer.tick_interval_ms"
        ));
        assert_eq!(cfg.timer.tick_interval_ms, 1000);
        cfg.set("timer.tick_interval_ms", "250").unwrap();
        assert_eq!(cfg.timer.tick_interval_ms, 250);
    }

    #[test]
    fn load_from_rejects_zero_tick_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ntick_interval_ms = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn task_lookup_ignores_case() {
        let cfg = Config::default();
        assert!(cfg.task("pomodoro").is_some());
        assert!(cfg.task("missing").is_none());
    }

    #[test]
    fn parses_task_tables() {
        let cfg: Config = toml::from_str(
            r#"
            [preferences]
            alarm_volume = 0

            [[tasks]]
            name = "Reading"
            pomodoro_duration = 50
            short_break_duration = 10
            long_break_duration = 30
            cycles = 2
            pomodoro_background_sound = "background3"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.preferences.alarm_volume, 0);
        assert_eq!(cfg.preferences.background_volume, 100);
        assert_eq!(cfg.tasks.len(), 1);
        let task = &cfg.tasks[0];
        assert_eq!(task.cycles, 2);
        assert_eq!(task.pomodoro_background_sound, "background3");
        assert_eq!(task.long_break_alarm_sound, "Vibration");
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.tasks.len(), 1);
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("preferences.alarm_volume", "20").unwrap();
        cfg.tasks.push(TaskConfig::new("Essay").with_cycles(3));
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.preferences.alarm_volume, 20);
        assert_eq!(loaded.task("essay").map(|t| t.cycles), Some(3));
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "preferences = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
