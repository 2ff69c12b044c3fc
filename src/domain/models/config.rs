//! Collector configuration.
//!
//! All environment-dependent knobs (base directories, remote endpoints,
//! hostname-to-hardware mapping) live here and are passed at construction;
//! nothing reads the environment at module load time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::hardware::Hardware;

/// Main configuration structure for Nightwatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Root directory for local nightly logs
    #[serde(default = "default_log_root")]
    pub log_root: String,

    /// Hostname -> hardware platform mapping for detection
    #[serde(default)]
    pub hostname_map: HashMap<String, Hardware>,

    /// Source fallback behaviour
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Remote log-mirror endpoints
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Result cache database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_log_root() -> String {
    "/var/log/nightly".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_root: default_log_root(),
            hostname_map: HashMap::new(),
            collection: CollectionConfig::default(),
            remote: RemoteConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which sources answer queries, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionMode {
    /// Remote mirror first, local filesystem as fallback.
    /// Used off the primary collection host (e.g. behind a firewall).
    RemoteFirst,
    /// Local filesystem only; the primary host collecting its own hardware.
    LocalOnly,
}

/// Source fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollectionConfig {
    #[serde(default = "default_mode")]
    pub mode: CollectionMode,

    /// Consult the result cache before resolving any logs
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

const fn default_mode() -> CollectionMode {
    CollectionMode::LocalOnly
}

const fn default_use_cache() -> bool {
    false
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            use_cache: default_use_cache(),
        }
    }
}

/// Remote Git-hosted log mirror configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfig {
    /// Content API base, e.g. "https://api.github.com/repos/org/logs/contents"
    #[serde(default)]
    pub api_base: String,

    /// Raw file base, e.g. "https://raw.githubusercontent.com/org/logs/log"
    #[serde(default)]
    pub raw_base: String,

    /// Optional bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_remote_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_remote_timeout_secs() -> u64 {
    10
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            raw_base: String::new(),
            token: None,
            timeout_secs: default_remote_timeout_secs(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".nightwatch/nightwatch.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
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

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Serialized, Yaml};
    use figment::Figment;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.collection.mode, CollectionMode::LocalOnly);
        assert!(!config.collection.use_cache);
        assert_eq!(config.remote.timeout_secs, 10);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r"
log_root: /data/nightly
collection:
  mode: remote_first
";
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml))
            .extract()
            .expect("config should deserialize");
        assert_eq!(config.log_root, "/data/nightly");
        assert_eq!(config.collection.mode, CollectionMode::RemoteFirst);
        assert_eq!(config.remote.timeout_secs, 10);
    }
}
