//! TOML-based application configuration.
//!
//! Stores:
//! - Login policy (password check on/off)
//! - Level timing (advance, step cadence, reset delays)
//! - Screen-time defaults for new kid accounts
//! - Hint service settings
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, CoreError};

/// Login policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Verify the signup password on login. Off reproduces the mock login
    /// that accepts username + account type alone.
    #[serde(default)]
    pub require_password: bool,
}

/// Delays of the timed transitions in the level engines, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_quiz_advance_ms")]
    pub quiz_advance_ms: u64,
    #[serde(default = "default_blocks_advance_ms")]
    pub blocks_advance_ms: u64,
    #[serde(default = "default_puzzle_step_ms")]
    pub puzzle_step_ms: u64,
    #[serde(default = "default_puzzle_success_ms")]
    pub puzzle_success_ms: u64,
    #[serde(default = "default_puzzle_reset_ms")]
    pub puzzle_reset_ms: u64,
}

/// Screen-time defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenTimeConfig {
    /// Limit given to kid accounts at signup; 0 = unlimited.
    #[serde(default)]
    pub default_limit_min: u32,
}

/// Hint service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HintConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_hint_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_hint_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_hint_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub screen_time: ScreenTimeConfig,
    #[serde(default)]
    pub hint: HintConfig,
}

// Default functions
fn default_quiz_advance_ms() -> u64 {
    1500
}
fn default_blocks_advance_ms() -> u64 {
    2000
}
fn default_puzzle_step_ms() -> u64 {
    500
}
fn default_puzzle_success_ms() -> u64 {
    1500
}
fn default_puzzle_reset_ms() -> u64 {
    2000
}
fn default_true() -> bool {
    true
}
fn default_hint_endpoint() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_hint_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_api_key_env() -> String {
    "API_KEY".into()
}
fn default_hint_timeout_secs() -> u64 {
    20
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            quiz_advance_ms: default_quiz_advance_ms(),
            blocks_advance_ms: default_blocks_advance_ms(),
            puzzle_step_ms: default_puzzle_step_ms(),
            puzzle_success_ms: default_puzzle_success_ms(),
            puzzle_reset_ms: default_puzzle_reset_ms(),
        }
    }
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_hint_endpoint(),
            model: default_hint_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_hint_timeout_secs(),
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
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
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

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
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

    /// Set a config value by key in memory. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Every leaf key with its value, in dot-path form.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
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
        assert!(!parsed.auth.require_password);
        assert_eq!(parsed.timing, TimingConfig::default());
        assert_eq!(parsed.hint.model, "gemini-2.5-flash");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[timing]\npuzzle_step_ms = 10\n").unwrap();
        assert_eq!(cfg.timing.puzzle_step_ms, 10);
        assert_eq!(cfg.timing.puzzle_reset_ms, 2000);
        assert_eq!(cfg.screen_time.default_limit_min, 0);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("auth.require_password").as_deref(), Some("false"));
        assert_eq!(cfg.get("timing.quiz_advance_ms").as_deref(), Some("1500"));
        assert_eq!(cfg.get("hint.api_key_env").as_deref(), Some("API_KEY"));
        assert!(cfg.get("timing.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("auth.require_password", "true").unwrap();
        cfg.set("screen_time.default_limit_min", "45").unwrap();
        cfg.set("hint.model", "gemini-pro").unwrap();
        assert!(cfg.auth.require_password);
        assert_eq!(cfg.screen_time.default_limit_min, 45);
        assert_eq!(cfg.hint.model, "gemini-pro");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_type() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timing.nonexistent", "1"),
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(matches!(
            cfg.set("auth.require_password", "maybe"),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(cfg.set("timing", "1").is_err());
    }

    #[test]
    fn entries_lists_leaf_keys() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert!(keys.contains(&"timing.puzzle_step_ms".to_string()));
        assert!(keys.contains(&"hint.enabled".to_string()));
        assert!(!keys.contains(&"timing".to_string()));
    }

    #[test]
    fn load_from_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timing.puzzle_step_ms, 500);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.set("timing.puzzle_step_ms", "5").unwrap();
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timing.puzzle_step_ms, 5);
    }

    #[test]
    fn load_from_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timing = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
