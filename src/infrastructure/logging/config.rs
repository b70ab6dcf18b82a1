use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::models::LoggingConfig as DomainLoggingConfig;

/// Logging configuration passed to [`super::logger::LoggerImpl::init`].
///
/// Distinct from [`DomainLoggingConfig`] (the YAML-loaded `level`/`format`
/// pair) because file output and rotation are operator flags, not part of
/// the project config schema — set via `RUNNERD_LOG_DIR`/`RUNNERD_LOG_ROTATION`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub enable_stdout: bool,
    #[serde(default)]
    pub rotation: RotationPolicy,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    Daily,
    Hourly,
    Never,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::Daily
    }
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> i64 {
    30
}

impl From<&DomainLoggingConfig> for LogConfig {
    fn from(config: &DomainLoggingConfig) -> Self {
        let format = if config.format == "pretty" {
            LogFormat::Pretty
        } else {
            LogFormat::Json
        };
        Self {
            level: config.level.clone(),
            format,
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
            retention_days: default_retention_days(),
        }
    }
}
