//! Configuration System
//!
//! Loads the terminal watcher's settings from a TOML file with environment
//! variable overrides. The poll interval is fixed and not configurable.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::poller::OverlapPolicy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the sensor-data endpoint lives
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Server root; `/sensor-data` is appended
    #[serde(default = "default_url")]
    pub url: String,

    /// Accept self-signed TLS certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_url() -> String {
    "https://localhost:5001".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            accept_invalid_certs: false,
        }
    }
}

/// Cycle scheduling
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollConfig {
    #[serde(default)]
    pub overlap: OverlapPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("sensorboard").join("config.toml")),
            Some(PathBuf::from("/etc/sensorboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SENSORBOARD_URL") {
            self.source.url = url;
        }
        if let Some(accept) = var("SENSORBOARD_ACCEPT_INVALID_CERTS") {
            self.source.accept_invalid_certs = accept.to_lowercase() == "true" || accept == "1";
        }

        if let Some(overlap) = var("SENSORBOARD_OVERLAP") {
            match overlap.parse() {
                Ok(policy) => self.poll.overlap = policy,
                Err(e) => tracing::warn!("Ignoring SENSORBOARD_OVERLAP: {}", e),
            }
        }

        if let Some(level) = var("SENSORBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("SENSORBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Sensorboard Configuration
#
# Environment variables override these settings:
# - SENSORBOARD_URL
# - SENSORBOARD_ACCEPT_INVALID_CERTS
# - SENSORBOARD_OVERLAP
# - SENSORBOARD_LOG_LEVEL
# - SENSORBOARD_LOG_FORMAT

[source]
# Server serving GET /sensor-data
url = "https://localhost:5001"

# Accept self-signed TLS certificates
accept_invalid_certs = false

[poll]
# What to do when a tick fires while a fetch is still running:
# allow (start another, last to finish wins) or skip
overlap = "allow"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
