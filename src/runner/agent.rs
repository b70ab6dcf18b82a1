//! Runner Agent run loop: accept→assign→execute→submit→complete
//! (spec.md §4.6).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::{Config, Task, TaskResultSubmission};
use crate::domain::ports::ContainerExecutor;

use super::server;

/// Bounded drain window for in-flight work on first shutdown signal
/// (spec.md §4.6).
const DRAIN_WINDOW: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct RegisterWebhookRequest {
    url: String,
    runner_id: String,
    device_id: String,
}

#[derive(Deserialize)]
struct RegisterWebhookResponse {
    id: Uuid,
}

#[derive(Serialize)]
struct AssignRequest {
    runner_id: String,
}

#[derive(Serialize)]
struct HeartbeatRequest {
    webhook_id: Uuid,
}

pub struct RunnerAgent {
    device_id: String,
    base_url: String,
    webhook_port: u16,
    heartbeat_interval: Duration,
    http_client: ReqwestClient,
    executor: Arc<dyn ContainerExecutor>,
}

impl RunnerAgent {
    pub fn new(config: &Config, device_id: String, executor: Arc<dyn ContainerExecutor>) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            device_id,
            base_url: format!("{}{}", config.runner.server_url, config.server.api_prefix),
            webhook_port: config.runner.webhook_port,
            heartbeat_interval: Duration::from_secs(config.runner.heartbeat_interval_secs),
            http_client,
            executor,
        })
    }

    /// Verify the dispatcher is reachable before registering a webhook.
    async fn verify_connectivity(&self) -> Result<()> {
        self.http_client
            .get(format!("{}/runners/tasks/available", self.base_url))
            .send()
            .await
            .context("could not reach dispatcher")?;
        Ok(())
    }

    async fn register_webhook(&self) -> Result<Uuid> {
        let url = format!("http://127.0.0.1:{}/", self.webhook_port);
        let response = self
            .http_client
            .post(format!("{}/runners/webhooks", self.base_url))
            .json(&RegisterWebhookRequest {
                url,
                runner_id: self.device_id.clone(),
                device_id: self.device_id.clone(),
            })
            .send()
            .await
            .context("webhook registration request failed")?
            .error_for_status()
            .context("webhook registration rejected")?;
        let body: RegisterWebhookResponse = response.json().await?;
        Ok(body.id)
    }

    async fn heartbeat_loop(&self, webhook_id: Uuid, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.heartbeat_interval);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let result = self
                        .http_client
                        .post(format!("{}/runners/heartbeat", self.base_url))
                        .json(&HeartbeatRequest { webhook_id })
                        .send()
                        .await;
                    if let Err(e) = result {
                        warn!(error = %e, "heartbeat delivery failed");
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }
    }

    /// Attempt to claim and run one offered task. Conflicts (another
    /// runner already claimed it) are skipped silently.
    async fn handle_offer(&self, task: Task, cancel: CancellationToken) {
        let assign_response = match self
            .http_client
            .post(format!("{}/tasks/{}/assign", self.base_url, task.id))
            .json(&AssignRequest {
                runner_id: self.device_id.clone(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "assign request failed");
                return;
            }
        };

        match assign_response.status() {
            StatusCode::OK => {}
            StatusCode::CONFLICT => {
                debug!(task_id = %task.id, "lost assignment race, skipping");
                return;
            }
            status => {
                warn!(task_id = %task.id, %status, "unexpected assign response");
                return;
            }
        }

        info!(task_id = %task.id, "claimed task");

        if let Err(e) = self.notify_start(task.id).await {
            warn!(task_id = %task.id, error = %e, "start notification failed");
        }

        let outcome = match self.executor.execute(&task, cancel).await {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                warn!(task_id = %task.id, "executor reported a fatal failure, no result to submit");
                return;
            }
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "executor error, no result to submit");
                return;
            }
        };

        let submission = TaskResultSubmission {
            task_id: task.id,
            exit_code: outcome.exit_code,
            output: outcome.output,
            execution_time_ns: outcome.execution_time_ns,
            resources: outcome.resources,
            logs_cid: outcome.logs_cid,
        };

        if let Err(e) = self.submit_result(&submission).await {
            warn!(task_id = %task.id, error = %e, "result submission failed");
            return;
        }

        if let Err(e) = self.notify_complete(task.id).await {
            warn!(task_id = %task.id, error = %e, "complete notification failed");
        }
    }

    async fn notify_start(&self, task_id: Uuid) -> Result<()> {
        self.http_client
            .post(format!("{}/runners/tasks/{}/start", self.base_url, task_id))
            .header("X-Runner-ID", &self.device_id)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn submit_result(&self, submission: &TaskResultSubmission) -> Result<()> {
        self.http_client
            .post(format!(
                "{}/runners/tasks/{}/result",
                self.base_url, submission.task_id
            ))
            .header("X-Device-ID", &self.device_id)
            .json(submission)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn notify_complete(&self, task_id: Uuid) -> Result<()> {
        self.http_client
            .post(format!("{}/runners/tasks/{}/complete", self.base_url, task_id))
            .header("X-Runner-ID", &self.device_id)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Run until `shutdown` is cancelled, then drain for up to
    /// [`DRAIN_WINDOW`] before returning.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) -> Result<()> {
        self.verify_connectivity().await?;
        let webhook_id = self.register_webhook().await?;
        info!(webhook_id = %webhook_id, "registered push target with dispatcher");

        let (tasks_tx, mut tasks_rx) = mpsc::channel(32);
        let server_handle = tokio::spawn(server::run(self.webhook_port, tasks_tx, shutdown.child_token()));

        let heartbeat_handle = {
            let this = Arc::clone(&self);
            let shutdown = shutdown.clone();
            tokio::spawn(async move { this.heartbeat_loop(webhook_id, shutdown).await })
        };

        loop {
            tokio::select! {
                offered = tasks_rx.recv() => {
                    match offered {
                        Some(tasks) => {
                            for task in tasks {
                                self.handle_offer(task, shutdown.child_token()).await;
                            }
                        }
                        None => break,
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, draining in-flight work");
                    break;
                }
            }
        }

        let _ = tokio::time::timeout(DRAIN_WINDOW, heartbeat_handle).await;
        server_handle.abort();
        Ok(())
    }
}
