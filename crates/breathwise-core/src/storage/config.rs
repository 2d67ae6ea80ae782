//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Notification text and channel setup
//! - Reconciliation behavior (cancel strategy, install retries)
//! - Breathing session durations
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;

/// Notification channel setup, applied once at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_channel_id")]
    pub id: String,
    #[serde(default = "default_channel_name")]
    pub name: String,
    #[serde(default = "default_importance")]
    pub importance: String,
    #[serde(default = "default_vibration_pattern")]
    pub vibration_pattern: Vec<u64>,
    #[serde(default = "default_light_color")]
    pub light_color: String,
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default)]
    pub show_badge: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// When false the local platform reports permission as denied.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_title")]
    pub title: String,
    /// `{label}` is replaced by the slot label in lower case.
    #[serde(default = "default_body_template")]
    pub body_template: String,
    #[serde(default = "default_sound")]
    pub sound: String,
    #[serde(default)]
    pub channel: ChannelConfig,
}

/// How previously installed triggers are removed before a new pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelStrategy {
    /// Ask the platform to drop every scheduled trigger.
    #[default]
    All,
    /// Cancel only the ids remembered from the previous pass.
    Recorded,
}

/// Reconciliation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub cancel_strategy: CancelStrategy,
    /// Extra attempts per slot after a failed install.
    #[serde(default = "default_install_retries")]
    pub install_retries: u32,
}

/// Breathing session configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_prepare_secs")]
    pub prepare_secs: u64,
    #[serde(default = "default_reset_delay_secs")]
    pub reset_delay_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_channel_id() -> String {
    "default".into()
}
fn default_channel_name() -> String {
    "Breathing Reminders".into()
}
fn default_importance() -> String {
    "max".into()
}
fn default_vibration_pattern() -> Vec<u64> {
    vec![0, 250, 250, 250]
}
fn default_light_color() -> String {
    "#2563EB".into()
}
fn default_title() -> String {
    "Break Free".into()
}
fn default_body_template() -> String {
    "Time for your 2 minutes {label} breathing!".into()
}
fn default_sound() -> String {
    "default".into()
}
fn default_install_retries() -> u32 {
    1
}
fn default_duration_secs() -> u64 {
    120
}
fn default_prepare_secs() -> u64 {
    30
}
fn default_reset_delay_secs() -> u64 {
    2
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            id: default_channel_id(),
            name: default_channel_name(),
            importance: default_importance(),
            vibration_pattern: default_vibration_pattern(),
            light_color: default_light_color(),
            sound: true,
            show_badge: false,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: default_title(),
            body_template: default_body_template(),
            sound: default_sound(),
            channel: ChannelConfig::default(),
        }
    }
}

impl NotificationsConfig {
    /// Notification body for a slot label.
    pub fn body_for(&self, label: &str) -> String {
        self.body_template.replace("{label}", &label.to_lowercase())
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            cancel_strategy: CancelStrategy::All,
            install_retries: default_install_retries(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            prepare_secs: default_prepare_secs(),
            reset_delay_secs: default_reset_delay_secs(),
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
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

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location inside the data directory.
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

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
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
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a value by dot-separated key without persisting.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default configuration");
                Self::default()
            }
        }
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
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[session]\nduration_secs = 60\n").unwrap();
        assert_eq!(parsed.session.duration_secs, 60);
        assert_eq!(parsed.session.prepare_secs, 30);
        assert_eq!(parsed.notifications.title, "Break Free");
        assert_eq!(parsed.reconcile.cancel_strategy, CancelStrategy::All);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("session.duration_secs").as_deref(), Some("120"));
        assert_eq!(cfg.get("reconcile.cancel_strategy").as_deref(), Some("all"));
        assert_eq!(
            cfg.get("notifications.channel.name").as_deref(),
            Some("Breathing Reminders")
        );
        assert!(cfg.get("notifications.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("notifications.enabled", "false").unwrap();
        cfg.set("session.prepare_secs", "10").unwrap();
        cfg.set("reconcile.cancel_strategy", "recorded").unwrap();
        cfg.set("notifications.channel.vibration_pattern", "[0, 100]").unwrap();
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.session.prepare_secs, 10);
        assert_eq!(cfg.reconcile.cancel_strategy, CancelStrategy::Recorded);
        assert_eq!(cfg.notifications.channel.vibration_pattern, vec![0, 100]);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("session.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("notifications.enabled", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("reconcile.cancel_strategy", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // a failed set leaves the config unchanged
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn body_lowercases_label() {
        let cfg = NotificationsConfig::default();
        assert_eq!(
            cfg.body_for("Morning"),
            "Time for your 2 minutes morning breathing!"
        );
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.session.duration_secs = 90;
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().session.duration_secs, 90);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
