//! Feed configuration file and environment variable handling.
//!
//! Configuration is read once at startup and shared immutably afterwards.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;

use crate::models::Coordinate;
use crate::services::access::{self, PLACEHOLDER_TOKEN};

/// Error raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Process-wide feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Shared secret required on every feed request
    pub auth_token: String,
    /// Longest window served in one feed, in days
    pub window_days: u32,
    /// Suggested client refresh interval, in seconds
    pub update_interval_secs: u64,
    /// IANA zone used when a request names none or an unknown one
    pub default_timezone: String,
    pub default_latitude: f64,
    pub default_longitude: f64,
    /// Maximum number of yearly statistics kept in memory
    pub year_cache_capacity: usize,
    /// Lifetime of a yearly statistics entry, never above the update interval
    pub year_cache_ttl_secs: u64,
    /// Deadline for building one feed, in seconds
    pub request_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            auth_token: PLACEHOLDER_TOKEN.to_string(),
            window_days: 365,
            update_interval_secs: 86_400,
            default_timezone: "America/Los_Angeles".to_string(),
            default_latitude: 45.58753958079636,
            default_longitude: -122.58886098861694,
            year_cache_capacity: 64,
            year_cache_ttl_secs: 86_400,
            request_timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `feed.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    ///
    /// Returns `Ok(None)` when no file exists.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        let search_paths = [
            PathBuf::from("feed.toml"),
            PathBuf::from("backend/feed.toml"),
            PathBuf::from("../feed.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Full startup load: `FEED_CONFIG` or the default location (or built-in
    /// defaults), then environment overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("FEED_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::from_default_location()?.unwrap_or_default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    ///
    /// # Environment Variables
    /// - `FEED_AUTH_TOKEN`: shared secret
    /// - `FEED_WINDOW_DAYS`: maximum feed length in days
    /// - `FEED_UPDATE_INTERVAL`: refresh interval in seconds
    /// - `FEED_DEFAULT_TIMEZONE`: fallback IANA zone
    /// - `FEED_YEAR_CACHE_CAPACITY`: yearly statistics kept in memory
    /// - `FEED_REQUEST_TIMEOUT`: per-feed deadline in seconds
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("FEED_AUTH_TOKEN") {
            self.auth_token = token.trim().to_string();
        }
        if let Some(value) = lookup("FEED_WINDOW_DAYS") {
            self.window_days = parse_number("FEED_WINDOW_DAYS", &value)?;
        }
        if let Some(value) = lookup("FEED_UPDATE_INTERVAL") {
            self.update_interval_secs = parse_number("FEED_UPDATE_INTERVAL", &value)?;
        }
        if let Some(zone) = lookup("FEED_DEFAULT_TIMEZONE") {
            self.default_timezone = zone.trim().to_string();
        }
        if let Some(value) = lookup("FEED_YEAR_CACHE_CAPACITY") {
            self.year_cache_capacity = parse_number("FEED_YEAR_CACHE_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("FEED_REQUEST_TIMEOUT") {
            self.request_timeout_secs = parse_number("FEED_REQUEST_TIMEOUT", &value)?;
        }
        Ok(())
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timezone.parse::<Tz>().is_err() {
            return Err(ConfigError::invalid(
                "default_timezone",
                &self.default_timezone,
                "not an IANA timezone",
            ));
        }
        if !(-90.0..=90.0).contains(&self.default_latitude) {
            return Err(ConfigError::invalid(
                "default_latitude",
                self.default_latitude,
                "must be within [-90, 90]",
            ));
        }
        if !(-180.0..=180.0).contains(&self.default_longitude) {
            return Err(ConfigError::invalid(
                "default_longitude",
                self.default_longitude,
                "must be within [-180, 180]",
            ));
        }
        if self.window_days == 0 {
            return Err(ConfigError::invalid("window_days", 0, "must be at least 1"));
        }
        if self.update_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "update_interval_secs",
                0,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn token_configured(&self) -> bool {
        access::is_configured(&self.auth_token)
    }

    /// The configured fallback zone, or UTC if it does not parse.
    pub fn default_tz(&self) -> Tz {
        self.default_timezone.parse().unwrap_or(Tz::UTC)
    }

    pub fn default_coordinate(&self) -> Coordinate {
        Coordinate::new(self.default_latitude, self.default_longitude)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// Statistics lifetime, clamped to the update interval.
    pub fn year_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.year_cache_ttl_secs).min(self.update_interval())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, value, "expected a non-negative integer"))
}
