//! `runnerd runner`: start the Runner Agent (spec.md §6).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::ports::ContainerExecutor;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::content_store::HttpContentStore;
use crate::infrastructure::credentials::device;
use crate::infrastructure::docker::BollardExecutor;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::runner::RunnerAgent;

pub async fn handle_runner(config: Option<PathBuf>, _json_mode: bool) -> Result<()> {
    let config = match config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))
        .context("failed to initialize logger")?;

    let config_dir = device::config_dir().context("could not resolve config directory")?;
    let device_id = device::load_or_generate(&config_dir)?;
    info!(device_id = %device_id, "runner identity loaded");

    let content_store = Arc::new(HttpContentStore::new(config.runner.content_store_url.clone())?);
    let executor: Arc<dyn ContainerExecutor> = Arc::new(BollardExecutor::connect_local(
        content_store,
        config.runner.docker.memory.clone(),
        config.runner.docker.cpu.clone(),
        config.runner.docker.timeout_secs,
    )?);

    let agent = Arc::new(RunnerAgent::new(&config, device_id, executor)?);

    let shutdown = CancellationToken::new();
    let shutdown_for_signals = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, draining");
            shutdown_for_signals.cancel();
        }
        // A second signal bypasses the drain window entirely.
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second shutdown signal received, terminating immediately");
            std::process::exit(1);
        }
    });

    agent.run(shutdown).await
}
