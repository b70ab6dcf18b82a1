//! Local webhook receiver: a minimal axum router with one route, matching
//! the push envelope the dispatcher's Push Fan-Out sends (spec.md §6).

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::models::Task;

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Vec<Task>,
}

#[derive(Clone)]
struct ReceiverState {
    tasks_tx: mpsc::Sender<Vec<Task>>,
}

async fn receive(
    State(state): State<ReceiverState>,
    Json(envelope): Json<PushEnvelope>,
) -> StatusCode {
    if envelope.kind != "available_tasks" {
        warn!(kind = %envelope.kind, "ignoring push envelope of unknown type");
        return StatusCode::OK;
    }
    debug!(count = envelope.payload.len(), "received available-task push");
    if state.tasks_tx.send(envelope.payload).await.is_err() {
        warn!("available-task channel closed, dropping push");
    }
    StatusCode::OK
}

/// Serve the local webhook endpoint until `shutdown` is cancelled. Offered
/// tasks are forwarded on `tasks_tx` for the run loop to consume.
pub async fn run(port: u16, tasks_tx: mpsc::Sender<Vec<Task>>, shutdown: CancellationToken) -> anyhow::Result<()> {
    let router = Router::new()
        .route("/", post(receive))
        .with_state(ReceiverState { tasks_tx });

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    debug!(%addr, "runner webhook receiver listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;
    Ok(())
}
