//! Top-level configuration structure, loaded hierarchically by
//! [`crate::infrastructure::config::ConfigLoader`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            chain: ChainConfig::default(),
            runner: RunnerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
const fn default_port() -> u16 {
    8080
}
fn default_api_prefix() -> String {
    "/api".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_prefix: default_api_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite:runnerd.db".to_string()
}
const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChainConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default)]
    pub token_address: String,
    #[serde(default)]
    pub stake_wallet_address: String,
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}
const fn default_chain_id() -> u64 {
    1
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            token_address: String::new(),
            stake_wallet_address: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DockerLimitsConfig {
    #[serde(default = "default_memory_limit")]
    pub memory: String,
    #[serde(default = "default_cpu_limit")]
    pub cpu: String,
    #[serde(default = "default_docker_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_memory_limit() -> String {
    "512m".to_string()
}
fn default_cpu_limit() -> String {
    "1.0".to_string()
}
const fn default_docker_timeout_secs() -> u64 {
    300
}

impl Default for DockerLimitsConfig {
    fn default() -> Self {
        Self {
            memory: default_memory_limit(),
            cpu: default_cpu_limit(),
            timeout_secs: default_docker_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    #[serde(default = "default_runner_server_url")]
    pub server_url: String,
    #[serde(default = "default_webhook_port")]
    pub webhook_port: u16,
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,
    /// Base URL the Container Executor PUTs de-framed log blobs to
    /// (spec.md §4.7 step 8). Not named by the distilled config schema;
    /// defaults to the dispatcher's own origin.
    #[serde(default = "default_content_store_url")]
    pub content_store_url: String,
    #[serde(default)]
    pub docker: DockerLimitsConfig,
}

fn default_runner_server_url() -> String {
    "http://localhost:8080".to_string()
}
const fn default_webhook_port() -> u16 {
    9090
}
const fn default_heartbeat_interval_secs() -> u64 {
    30
}
fn default_content_store_url() -> String {
    "http://localhost:8080/content".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server_url: default_runner_server_url(),
            webhook_port: default_webhook_port(),
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            content_store_url: default_content_store_url(),
            docker: DockerLimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
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
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
