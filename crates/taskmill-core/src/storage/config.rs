//! TOML-based application configuration.
//!
//! Stores the configured timezone and the default generation horizon.
//! Configuration is stored at `~/.config/taskmill/config.toml`; a missing
//! file yields the defaults. The loaded value is passed down explicitly
//! (notably into [`crate::calendar::Calendar`]) and never cached
//! process-wide.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::calendar::Calendar;
use crate::error::{ConfigError, Result};
use crate::recurrence::MAX_HORIZON_DAYS;

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskmill/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone used to resolve "today"
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Horizon for `generate` when no explicit window is given
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_horizon_days() -> u32 {
    crate::recurrence::DEFAULT_HORIZON_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timezone: default_timezone(),
            default_horizon_days: default_horizon_days(),
        }
    }
}

impl Config {
    /// Path of the configuration file inside the data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file does
    /// not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Read a value by key (`timezone`, `default_horizon_days`).
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "timezone" => Ok(self.timezone.clone()),
            "default_horizon_days" => Ok(self.default_horizon_days.to_string()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Set a value by key, validating it first.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "timezone" => {
                Calendar::new(value)?;
                self.timezone = value.to_string();
                Ok(())
            }
            "default_horizon_days" => {
                let days: u32 = value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("'{value}' is not a number"),
                })?;
                if days == 0 || days > MAX_HORIZON_DAYS {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("must be between 1 and {MAX_HORIZON_DAYS}"),
                    });
                }
                self.default_horizon_days = days;
                Ok(())
            }
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.timezone, "UTC");
        assert_eq!(config.default_horizon_days, 14);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str("timezone = \"Europe/Berlin\"").unwrap();
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.default_horizon_days, 14);
    }

    #[test]
    fn get_and_set() {
        let mut config = Config::default();
        config.set("timezone", "America/New_York").unwrap();
        assert_eq!(config.get("timezone").unwrap(), "America/New_York");

        assert!(config.set("timezone", "Nowhere/Atlantis").is_err());
        assert!(config.set("default_horizon_days", "0").is_err());
        assert!(config.set("default_horizon_days", "9999").is_err());
        config.set("default_horizon_days", "30").unwrap();
        assert_eq!(config.default_horizon_days, 30);

        assert!(config.get("volume").is_err());
        assert!(config.set("volume", "11").is_err());
    }
}
