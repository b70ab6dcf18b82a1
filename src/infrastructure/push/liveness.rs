//! Liveness Monitor: evicts push targets that stop heartbeating and
//! reclaims any task still assigned to them (spec.md §4.3).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::models::TaskStatus;
use crate::services::TaskService;

use super::fanout::FanOut;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const STALE_THRESHOLD: chrono::Duration = chrono::Duration::minutes(2);

pub struct LivenessMonitor {
    fanout: Arc<FanOut>,
    task_service: Arc<TaskService>,
}

impl LivenessMonitor {
    pub fn new(fanout: Arc<FanOut>, task_service: Arc<TaskService>) -> Self {
        Self {
            fanout,
            task_service,
        }
    }

    /// Run the 60s sweep until `shutdown` is cancelled. Same interval +
    /// select shape the teacher uses for its MCP health monitor, with the
    /// shutdown signal swapped for this crate's `CancellationToken`.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.tick().await; // first tick fires immediately

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep().await;
                }
                _ = shutdown.cancelled() => {
                    info!("liveness monitor shutting down");
                    break;
                }
            }
        }
    }

    async fn sweep(&self) {
        let now = Utc::now();
        let stale: Vec<_> = self
            .fanout
            .targets_snapshot()
            .await
            .into_iter()
            .filter(|t| t.is_stale(now, STALE_THRESHOLD))
            .collect();

        for target in stale {
            self.fanout.evict(target.id).await;
            warn!(target_id = %target.id, runner_id = %target.runner_id, "evicted stale push target");
            self.reclaim_running_task_for(&target.device_id).await;
        }
    }

    async fn reclaim_running_task_for(&self, device_id: &str) {
        let tasks = match self.task_service.list_all().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "could not list tasks for liveness reclaim");
                return;
            }
        };
        for task in tasks {
            if task.status == TaskStatus::Running && task.runner_id.as_deref() == Some(device_id) {
                if let Err(e) = self.task_service.reclaim(task.id).await {
                    warn!(task_id = %task.id, error = %e, "failed to reclaim task from evicted runner");
                }
            }
        }
    }
}
