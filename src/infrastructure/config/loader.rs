//! Configuration loading with hierarchical merging.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("log_root cannot be empty")]
    EmptyLogRoot,

    #[error("database path cannot be empty")]
    EmptyDatabasePath,

    #[error("invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("invalid remote timeout: {0}. Must be between 1 and 120 seconds")]
    InvalidRemoteTimeout(u64),

    #[error("invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("remote_first mode requires remote.api_base and remote.raw_base")]
    MissingRemoteEndpoints,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. nightwatch.yaml in the working directory
    /// 3. Environment variables (NIGHTWATCH_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("nightwatch.yaml"))
            .merge(Env::prefixed("NIGHTWATCH_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.log_root.trim().is_empty() {
            return Err(ConfigError::EmptyLogRoot);
        }
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }
        if config.remote.timeout_secs == 0 || config.remote.timeout_secs > 120 {
            return Err(ConfigError::InvalidRemoteTimeout(config.remote.timeout_secs));
        }
        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(ConfigError::InvalidLogLevel(other.to_string())),
        }
        match config.logging.format.as_str() {
            "json" | "pretty" => {}
            other => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        }
        if config.collection.mode == crate::domain::models::CollectionMode::RemoteFirst
            && (config.remote.api_base.is_empty() || config.remote.raw_base.is_empty())
        {
            return Err(ConfigError::MissingRemoteEndpoints);
        }
        Ok(())
    }
}
