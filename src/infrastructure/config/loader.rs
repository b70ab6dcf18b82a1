use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid log level: {0}. must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid log format: {0}. must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("database url cannot be empty")]
    EmptyDatabaseUrl,

    #[error("invalid max_connections: {0}. must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("invalid server port: {0}")]
    InvalidPort(u16),

    #[error("chain.token_address and chain.stake_wallet_address must be set to run `server`")]
    MissingChainAddresses,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `.runnerd/config.yaml` (project config)
    /// 3. `.runnerd/local.yaml` (project local overrides, optional)
    /// 4. Environment variables (`RUNNERD_` prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".runnerd/config.yaml"))
            .merge(Yaml::file(".runnerd/local.yaml"))
            .merge(Env::prefixed("RUNNERD_").split("__"))
            .extract()
            .context("failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, skipping the project
    /// `.runnerd/` lookup. Used by tests and `--config <path>`.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("RUNNERD_").split("__"))
            .extract()
            .context(format!("failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Structural validation beyond what serde's defaults cover.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.url.is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort(config.server.port));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }

    /// Separate from `validate` because the `auth`/`migrate` subcommands
    /// construct a `Config` with no chain addresses set and must not fail.
    pub fn require_chain_addresses(config: &Config) -> Result<(), ConfigError> {
        if config.chain.token_address.is_empty() || config.chain.stake_wallet_address.is_empty() {
            return Err(ConfigError::MissingChainAddresses);
        }
        Ok(())
    }
}
