use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("API base URL cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid interval_ms: {0}. Must be positive")]
    InvalidPollInterval(u64),

    #[error("Invalid refresh_delays_ms: expected 2 entries, got {0}")]
    InvalidRefreshDelays(usize),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .weaver/config.yaml
    /// 3. .weaver/local.yaml (local overrides, optional)
    /// 4. Environment variables (WEAVER_* prefix, `__` separates sections)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".weaver/config.yaml"))
            .merge(Yaml::file(".weaver/local.yaml"))
            .merge(Env::prefixed("WEAVER_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring `WEAVER_*`
    /// overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("WEAVER_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.api.timeout_secs));
        }

        if config.polling.interval_ms == 0 {
            return Err(ConfigError::InvalidPollInterval(config.polling.interval_ms));
        }

        if config.polling.refresh_delays_ms.len() != 2 {
            return Err(ConfigError::InvalidRefreshDelays(
                config.polling.refresh_delays_ms.len(),
            ));
        }

        if config.storage.database_path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.storage.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.storage.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.polling.interval_ms, 2_000);
        assert_eq!(config.polling.refresh_delays_ms, vec![1_500, 4_000]);
        assert_eq!(config.storage.database_path, ".weaver/cockpit.db");
        assert_eq!(config.logging.level, "warn");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
api:
  base_url: https://weaver.example.com/api
  timeout_secs: 10
polling:
  interval_ms: 500
storage:
  database_path: /tmp/cockpit.db
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.api.base_url, "https://weaver.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.polling.interval_ms, 500);
        assert_eq!(config.polling.refresh_delays_ms, vec![1_500, 4_000]);
        assert_eq!(config.storage.database_path, "/tmp/cockpit.db");
        assert_eq!(config.storage.max_connections, 2);
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.api.base_url = "  ".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyBaseUrl)
        ));
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = Config::default();
        config.polling.interval_ms = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidPollInterval(0))
        ));
    }

    #[test]
    fn test_validate_refresh_delay_count() {
        let mut config = Config::default();
        config.polling.refresh_delays_ms = vec![1_000];

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRefreshDelays(1))
        ));
    }

    #[test]
    fn test_validate_storage() {
        let mut config = Config::default();
        config.storage.database_path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.storage.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn test_validate_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel, got {other:?}"),
        }

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "polling:\n  interval_ms: 750\nlogging:\n  level: info").unwrap();
        file.flush().unwrap();

        let config = temp_env::with_vars(
            [
                ("WEAVER_LOGGING__LEVEL", Some("debug")),
                ("WEAVER_API__BASE_URL", Some("http://engine:9000/api")),
            ],
            || ConfigLoader::load_from_file(file.path()).unwrap(),
        );

        assert_eq!(config.polling.interval_ms, 750, "File value should apply");
        assert_eq!(config.logging.level, "debug", "Env should win over file");
        assert_eq!(config.api.base_url, "http://engine:9000/api");
        assert_eq!(config.storage.database_path, ".weaver/cockpit.db");
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "polling:\n  interval_ms: 1000\nlogging:\n  level: info\n  format: json").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "polling:\n  interval_ms: 250\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.polling.interval_ms, 250, "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "polling:\n  refresh_delays_ms: [1, 2, 3]").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("refresh_delays_ms"));
    }
}
