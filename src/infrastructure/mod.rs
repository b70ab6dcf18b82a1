//! Infrastructure layer
//!
//! Adapters for every external dependency the domain and service layers
//! talk to through a port: SQLite persistence, layered YAML+env config,
//! structured logging, on-disk credentials, the on-chain stake/reward
//! contract, the Docker container runtime, content-addressed log storage,
//! and the push fan-out/liveness components.

pub mod chain;
pub mod config;
pub mod content_store;
pub mod credentials;
pub mod database;
pub mod docker;
pub mod logging;
pub mod push;
