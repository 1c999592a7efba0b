//! Configuration for the hydrate engine.
//!
//! Settings live in a small JSON file under the standard configuration
//! directory (`~/.config/hydrate/config.json` on most platforms). The
//! `HYDRATE_CONFIG_PATH` environment variable overrides the location. Every
//! field has a default, so a missing file or a partial file is valid.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Environment variable allowing callers to override the configuration file path.
pub const CONFIG_PATH_ENV: &str = "HYDRATE_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Errors surfaced when loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid { message: message.into() }
    }
}

/// Top-level configuration document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrateConfig {
    #[serde(default)]
    pub cache: CacheConfig,
}

impl HydrateConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()
    }
}

/// Expiry and eviction policy for the collection cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached entry, in milliseconds.
    pub ttl_ms: u64,
    /// Interval between background sweeps, in milliseconds.
    pub sweep_interval_ms: u64,
}

impl CacheConfig {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(2);
    pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }

    /// Set the entry time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = duration_millis(ttl);
        self
    }

    /// Set the background sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_ms = duration_millis(interval);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_ms == 0 {
            return Err(ConfigError::invalid("cache.ttl_ms must be greater than zero"));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::invalid("cache.sweep_interval_ms must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: duration_millis(Self::DEFAULT_TTL),
            sweep_interval_ms: duration_millis(Self::DEFAULT_SWEEP_INTERVAL),
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("hydrate").join(CONFIG_FILE_NAME)
}

/// Loads configuration from the default path.
pub fn load_config() -> Result<HydrateConfig, ConfigError> {
    load_config_from_path(&default_config_path())
}

/// Loads configuration from a specific path. A missing file yields defaults.
pub fn load_config_from_path(path: &Path) -> Result<HydrateConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file found; using defaults");
            return Ok(HydrateConfig::default());
        }
        Err(error) => return Err(ConfigError::Io(error)),
    };

    let config: HydrateConfig = serde_json::from_str(&content)?;
    config.validate()?;
    debug!(
        path = %path.display(),
        ttl_ms = config.cache.ttl_ms,
        sweep_interval_ms = config.cache.sweep_interval_ms,
        "loaded config"
    );
    Ok(config)
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_fixed_policy() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl(), Duration::from_secs(2));
        assert_eq!(config.sweep_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, HydrateConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "cache": { "ttl_ms": 500 } }"#).unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_millis(500));
        assert_eq!(config.cache.sweep_interval(), CacheConfig::DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        let error = load_config_from_path(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Json(_)));
    }

    #[test]
    fn zero_durations_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "cache": { "sweep_interval_ms": 0 } }"#).unwrap();

        let error = load_config_from_path(&path).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { .. }));
        assert!(CacheConfig::new().with_ttl(Duration::ZERO).validate().is_err());
    }

    #[test]
    fn default_path_honors_environment_override() {
        let override_path = "~/custom/hydrate/config.json";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            let path = default_config_path();
            assert_eq!(path, expand_tilde(override_path));
            assert!(path.ends_with("custom/hydrate/config.json"));
        });
    }
}
