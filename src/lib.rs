//! runnerd — reward-backed distributed task coordinator and runner agent.
//!
//! - Stake-gated task admission and atomic lifecycle tracking
//! - Push fan-out delivery to registered runner webhooks, with a liveness
//!   sweep that evicts silent targets
//! - Docker-sandboxed task execution with resource metering
//! - On-chain stake/reward settlement

pub mod cli;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod runner;
pub mod services;

pub use infrastructure::database::DatabaseConnection;
