//! Application settings at ~/.config/holiday-notifier/config.toml
//!
//! Every key is optional. Missing keys take their defaults, unknown keys are
//! ignored, and a file that fails to parse yields the defaults after being
//! renamed to `config.toml.corrupt-<timestamp>`, so a later save cannot
//! replace it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{HolidayError, HolidayResult};
use crate::evaluator::DEFAULT_WINDOW_DAYS;
use crate::paths;

pub const DEFAULT_SOURCE_URL: &str = "https://www.officeholidays.com/countries/malaysia";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Longest accepted refresh interval: one year.
pub const MAX_CHECK_INTERVAL_HOURS: u64 = 24 * 365;

/// Keys accepted by [`AppConfig::set`].
pub const KEYS: &[&str] = &[
    "run_on_startup",
    "check_interval_hours",
    "notification_days_ahead",
    "source_url",
    "request_timeout_secs",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Whether the user asked to launch at login. Stored only; registering
    /// with the OS is left to the platform.
    pub run_on_startup: bool,

    /// Hours between periodic refreshes.
    pub check_interval_hours: u64,

    /// Size of the upcoming window used for notifications.
    pub notification_days_ahead: i64,

    /// Country page on officeholidays.com; `/<year>` is appended per year.
    pub source_url: String,

    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            run_on_startup: false,
            check_interval_hours: 24,
            notification_days_ahead: DEFAULT_WINDOW_DAYS,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> HolidayResult<PathBuf> {
        Ok(paths::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load from the default location.
    pub fn load() -> HolidayResult<Self> {
        Ok(Self::load_from(&Self::config_path()?))
    }

    /// Load from `path`, falling back to defaults if the file is corrupt.
    pub fn load_from(path: &Path) -> Self {
        let error = match Self::try_load_from(path) {
            Ok(config) => return config,
            Err(e) => e,
        };

        match paths::move_aside(path) {
            Ok(backup) => tracing::warn!(
                path = %path.display(),
                backup = %backup.display(),
                %error,
                "config file could not be parsed, moved aside and using defaults"
            ),
            Err(move_error) => tracing::warn!(
                path = %path.display(),
                %error,
                %move_error,
                "config file could not be parsed, using defaults"
            ),
        }
        Self::default()
    }

    fn try_load_from(path: &Path) -> HolidayResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| HolidayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| HolidayError::Config(e.to_string()))
    }

    pub fn save(&self) -> HolidayResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> HolidayResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                HolidayError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| HolidayError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| HolidayError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Period between scheduled refreshes. Values edited into the file by
    /// hand are clamped to the range `set` accepts.
    pub fn check_interval(&self) -> Duration {
        let hours = self
            .check_interval_hours
            .clamp(1, MAX_CHECK_INTERVAL_HOURS);
        Duration::from_secs(hours * 3600)
    }

    /// Update one key from its string form. Dashes and underscores are
    /// interchangeable in the key name.
    pub fn set(&mut self, key: &str, value: &str) -> HolidayResult<()> {
        let key = key.replace('-', "_");
        match key.as_str() {
            "run_on_startup" => self.run_on_startup = parse_value(&key, value)?,
            "check_interval_hours" => {
                let hours: u64 = parse_value(&key, value)?;
                if !(1..=MAX_CHECK_INTERVAL_HOURS).contains(&hours) {
                    return Err(HolidayError::Config(format!(
                        "check_interval_hours must be between 1 and {MAX_CHECK_INTERVAL_HOURS}"
                    )));
                }
                self.check_interval_hours = hours;
            }
            "notification_days_ahead" => {
                let days: i64 = parse_value(&key, value)?;
                if days < 1 {
                    return Err(HolidayError::Config(
                        "notification_days_ahead must be at least 1".into(),
                    ));
                }
                self.notification_days_ahead = days;
            }
            "source_url" => self.source_url = value.trim_end_matches('/').to_string(),
            "request_timeout_secs" => self.request_timeout_secs = parse_value(&key, value)?,
            _ => {
                return Err(HolidayError::Config(format!(
                    "Unknown key '{}'. Available: {}",
                    key,
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Current value of `key` in string form.
    pub fn get(&self, key: &str) -> Option<String> {
        match key.replace('-', "_").as_str() {
            "run_on_startup" => Some(self.run_on_startup.to_string()),
            "check_interval_hours" => Some(self.check_interval_hours.to_string()),
            "notification_days_ahead" => Some(self.notification_days_ahead.to_string()),
            "source_url" => Some(self.source_url.clone()),
            "request_timeout_secs" => Some(self.request_timeout_secs.to_string()),
            _ => None,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> HolidayResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HolidayError::Config(format!("Invalid value '{value}' for {key}")))
}
