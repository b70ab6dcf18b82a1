//! `runnerd server`: start the dispatcher — Task Service, HTTP surface,
//! Push Fan-Out, and Liveness Monitor (spec.md §4, §6).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::domain::ports::{RewardDispatcher, StakeOracle, TaskChangeEmitter, TaskRepository};
use crate::http::{self, AppState};
use crate::infrastructure::chain::{ChainClient, ChainRewardDispatcher, ChainStakeOracle};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::{device, keystore};
use crate::infrastructure::database::{DatabaseConnection, SqliteTaskRepository, SqliteTaskResultRepository};
use crate::infrastructure::logging::{LogConfig, LoggerImpl};
use crate::infrastructure::push::{FanOut, LivenessMonitor};
use crate::services::TaskService;

pub async fn handle_server(config: Option<PathBuf>, _json_mode: bool) -> Result<()> {
    let config = match config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    ConfigLoader::require_chain_addresses(&config)?;

    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))
        .context("failed to initialize logger")?;

    let db = DatabaseConnection::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await.context("failed to apply database migrations")?;

    let task_repo: Arc<dyn TaskRepository> = Arc::new(SqliteTaskRepository::new(db.pool().clone()));
    let result_repo = Arc::new(SqliteTaskResultRepository::new(db.pool().clone()));

    let config_dir = device::config_dir().context("could not resolve config directory")?;
    let wallet = keystore::load(&config_dir)?;
    let chain_client = ChainClient::connect(
        &config.chain.rpc_url,
        config.chain.chain_id,
        &config.chain.stake_wallet_address,
        wallet,
    )
    .await?;

    let stake_oracle: Arc<dyn StakeOracle> = Arc::new(ChainStakeOracle::new(chain_client.clone()));
    let reward_dispatcher: Arc<dyn RewardDispatcher> =
        Arc::new(ChainRewardDispatcher::new(chain_client));

    let stake_oracle_for_state = Arc::clone(&stake_oracle);
    let task_repo_for_service = Arc::clone(&task_repo);
    let fanout = FanOut::new_cyclic(move |emitter: Arc<dyn TaskChangeEmitter>| {
        Arc::new(TaskService::new(
            task_repo_for_service,
            result_repo,
            stake_oracle,
            emitter,
        ))
    })
    .context("failed to build push fan-out")?;

    let task_service = fanout.task_service();

    let state = AppState {
        task_service: Arc::clone(&task_service),
        task_repo,
        stake_oracle: stake_oracle_for_state,
        reward_dispatcher,
        fanout: Arc::clone(&fanout),
    };

    let shutdown = CancellationToken::new();

    let fanout_task = tokio::spawn({
        let fanout = Arc::clone(&fanout);
        let shutdown = shutdown.clone();
        async move { fanout.run(shutdown).await }
    });
    let liveness_task = tokio::spawn({
        let monitor = LivenessMonitor::new(Arc::clone(&fanout), Arc::clone(&task_service));
        let shutdown = shutdown.clone();
        async move { monitor.run(shutdown).await }
    });

    let router = http::routes::build(&config.server.api_prefix, state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "runnerd server listening");

    let serve_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            serve_shutdown.cancel();
        })
        .await
        .context("http server error")?;

    shutdown.cancel();
    let _ = fanout_task.await;
    let _ = liveness_task.await;
    Ok(())
}
