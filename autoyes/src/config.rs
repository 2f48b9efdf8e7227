//! Persisted user configuration.
//!
//! Stored as pretty-printed JSON at `<config dir>/autoyes/config.json`.
//! Missing keys fall back to their defaults; command-line flags override
//! whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::{DEFAULT_COOLDOWN, DEFAULT_RESPONSE, SessionConfig};

const DIR_NAME: &str = "autoyes";
const FILE_NAME: &str = "config.json";

/// User configuration file contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extra regex patterns applied to every session.
    pub custom_patterns: Vec<String>,

    /// Default reply.
    pub response: String,

    /// Seconds between two auto-responses.
    pub cooldown: f64,

    /// Print a notice for every auto-response.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_patterns: Vec::new(),
            response: DEFAULT_RESPONSE.to_string(),
            cooldown: DEFAULT_COOLDOWN.as_secs_f64(),
            verbose: false,
        }
    }
}

impl Config {
    /// Location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join(DIR_NAME).join(FILE_NAME))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, returning defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        text.push('\n');
        fs::write(path, text).map_err(io_err)?;
        debug!("saved config to {}", path.display());
        Ok(())
    }

    /// Add a custom pattern. Returns `false` if it was already present.
    pub fn add_pattern(&mut self, pattern: &str) -> bool {
        if self.custom_patterns.iter().any(|known| known == pattern) {
            return false;
        }
        self.custom_patterns.push(pattern.to_string());
        true
    }

    /// Remove a custom pattern. Returns `false` if it was not present.
    pub fn remove_pattern(&mut self, pattern: &str) -> bool {
        let before = self.custom_patterns.len();
        self.custom_patterns.retain(|known| known != pattern);
        self.custom_patterns.len() != before
    }

    /// Cooldown as a duration. Negative or non-finite values mean no cooldown.
    pub fn cooldown_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.cooldown).unwrap_or(Duration::ZERO)
    }

    /// Session configuration seeded from this file.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            response: self.response.clone(),
            cooldown: self.cooldown_duration(),
            verbose: self.verbose,
            extra_patterns: self.custom_patterns.clone(),
            ..SessionConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_path(dir: &TempDir) -> PathBuf {
        dir.path().join("autoyes").join("config.json")
    }

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&config_path(&dir)).unwrap();
        assert_eq!(config.response, "y");
        assert_eq!(config.cooldown, 0.5);
        assert!(config.custom_patterns.is_empty());
        assert!(!config.verbose);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let mut config = Config::default();
        config.response = "yes".into();
        config.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(Config::load_from(&path).unwrap().response, "yes");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"verbose": true}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.response, "y");
        assert_eq!(config.cooldown, 0.5);
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_add_pattern_dedup() {
        let dir = TempDir::new().unwrap();
        let path = config_path(&dir);

        let mut config = Config::load_from(&path).unwrap();
        assert!(config.add_pattern(r"my_prompt\?"));
        assert!(!config.add_pattern(r"my_prompt\?"));
        config.save_to(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.custom_patterns, vec![r"my_prompt\?"]);
    }

    #[test]
    fn test_remove_pattern() {
        let mut config = Config::default();
        config.add_pattern("gone");
        assert!(config.remove_pattern("gone"));
        assert!(config.custom_patterns.is_empty());
        assert!(!config.remove_pattern("never_added"));
    }

    #[test]
    fn test_session_config_carries_file_values() {
        let config = Config {
            custom_patterns: vec!["p".into()],
            response: "ok".into(),
            cooldown: 1.5,
            verbose: true,
        };
        let session = config.session_config();
        assert_eq!(session.response, "ok");
        assert_eq!(session.cooldown, Duration::from_millis(1500));
        assert!(session.verbose);
        assert_eq!(session.extra_patterns, vec!["p"]);
        assert!(session.attach_stdin);
    }

    #[test]
    fn test_negative_cooldown_is_zero() {
        let config = Config {
            cooldown: -1.0,
            ..Config::default()
        };
        assert_eq!(config.cooldown_duration(), Duration::ZERO);
    }
}
