//! Push Fan-Out: maintains the set of registered runner webhooks and
//! delivers the available-task list to them on every task-visibility
//! change (spec.md §4.2).

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use serde::Serialize;
use tokio::sync::{Notify, RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::Task;
use crate::domain::ports::TaskChangeEmitter;
use crate::services::TaskService;

use super::target::PushTarget;

const MAX_CONCURRENT_DELIVERIES: usize = 10;
const PER_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Serialize)]
struct AvailableTasksEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: &'a [Task],
}

/// Registration map plus delivery mechanics. One instance is shared as
/// `Arc<FanOut>` between the HTTP layer (register/unregister/heartbeat),
/// the Task Service (`signal` via [`TaskChangeEmitter`]), and the
/// [`super::liveness`] sweeper.
pub struct FanOut {
    targets: RwLock<HashMap<Uuid, PushTarget>>,
    task_service: Arc<TaskService>,
    http_client: ReqwestClient,
    notify: Notify,
    semaphore: Semaphore,
}

impl FanOut {
    pub fn new(task_service: Arc<TaskService>) -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(PER_REQUEST_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self {
            targets: RwLock::new(HashMap::new()),
            task_service,
            http_client,
            notify: Notify::new(),
            semaphore: Semaphore::new(MAX_CONCURRENT_DELIVERIES),
        })
    }

    /// Construct a `FanOut` together with the `TaskService` it will notify,
    /// breaking the construction cycle: `TaskService` needs a
    /// [`TaskChangeEmitter`] that is this `FanOut`, and `FanOut` needs the
    /// `TaskService` it delivers on behalf of. `make_task_service` is handed
    /// a weak-upgrading emitter so it can build its `TaskService` before the
    /// `Arc<FanOut>` itself exists.
    pub fn new_cyclic(
        make_task_service: impl FnOnce(Arc<dyn TaskChangeEmitter>) -> Arc<TaskService>,
    ) -> anyhow::Result<Arc<Self>> {
        let http_client = ReqwestClient::builder()
            .timeout(PER_REQUEST_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;

        Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
            let emitter: Arc<dyn TaskChangeEmitter> = Arc::new(WeakFanOutEmitter(weak.clone()));
            let task_service = make_task_service(emitter);
            Self {
                targets: RwLock::new(HashMap::new()),
                task_service,
                http_client,
                notify: Notify::new(),
                semaphore: Semaphore::new(MAX_CONCURRENT_DELIVERIES),
            }
        }))
    }

    /// The `TaskService` this fan-out notifies — shared so callers don't
    /// need to keep a second `Arc` around from construction time.
    pub fn task_service(&self) -> Arc<TaskService> {
        Arc::clone(&self.task_service)
    }

    pub async fn register(
        self: &Arc<Self>,
        url: impl Into<String>,
        runner_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Uuid {
        let target = PushTarget::new(url, runner_id, device_id);
        let id = target.id;
        let url = target.url.clone();
        self.targets.write().await.insert(id, target);

        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.deliver_one(&url).await;
        });
        id
    }

    pub async fn unregister(&self, target_id: Uuid) -> bool {
        self.targets.write().await.remove(&target_id).is_some()
    }

    /// Refresh a target's `last_heartbeat_at`. Returns `false` if the
    /// target is unknown (already evicted, or never registered).
    pub async fn heartbeat(&self, target_id: Uuid) -> bool {
        if let Some(target) = self.targets.write().await.get_mut(&target_id) {
            target.last_heartbeat_at = chrono::Utc::now();
            true
        } else {
            false
        }
    }

    pub async fn targets_snapshot(&self) -> Vec<PushTarget> {
        self.targets.read().await.values().cloned().collect()
    }

    pub async fn evict(&self, target_id: Uuid) -> Option<PushTarget> {
        self.targets.write().await.remove(&target_id)
    }

    async fn deliver_one(&self, url: &str) {
        let tasks = match self.task_service.list_available().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(url, error = %e, "could not load available tasks for push delivery");
                return;
            }
        };
        let envelope = AvailableTasksEnvelope {
            kind: "available_tasks",
            payload: &tasks,
        };
        let _permit = self.semaphore.acquire().await;
        match self
            .http_client
            .post(url)
            .json(&envelope)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(url, "push delivery succeeded");
            }
            Ok(response) => {
                warn!(url, status = %response.status(), "push delivery rejected");
            }
            Err(e) => {
                warn!(url, error = %e, "push delivery failed");
            }
        }
    }

    /// Snapshot targets and the current available-task list, then dispatch
    /// concurrently with the shared concurrency cap (spec.md §4.2).
    async fn deliver_all(self: &Arc<Self>) {
        let targets = self.targets_snapshot().await;
        if targets.is_empty() {
            return;
        }
        let mut handles = Vec::with_capacity(targets.len());
        for target in targets {
            let this = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                this.deliver_one(&target.url).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Run the coalescing delivery loop until `shutdown` is cancelled.
    /// In-flight deliveries are not awaited past shutdown — each POST has
    /// its own 5s timeout, so the loop exiting bounds the drain.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = self.notify.notified() => {
                    self.deliver_all().await;
                }
                _ = shutdown.cancelled() => {
                    debug!("push fan-out shutting down");
                    break;
                }
            }
        }
    }
}

impl TaskChangeEmitter for FanOut {
    fn signal(&self) {
        self.notify.notify_one();
    }
}

/// Forwards `signal()` to a `FanOut` that may not have finished
/// constructing yet (see [`FanOut::new_cyclic`]); a dead weak reference
/// (fan-out dropped) makes this a silent no-op.
struct WeakFanOutEmitter(Weak<FanOut>);

impl TaskChangeEmitter for WeakFanOutEmitter {
    fn signal(&self) {
        if let Some(fanout) = self.0.upgrade() {
            TaskChangeEmitter::signal(&*fanout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_assigns_a_target_id_and_tracks_it() {
        let service = crate::services::task_service::tests::in_memory_service();
        let fanout = Arc::new(FanOut::new(service).unwrap());
        let id = fanout.register("http://127.0.0.1:0/hook", "runner-1", "a".repeat(64)).await;
        // allow the spawned immediate-delivery task to run and fail quietly
        tokio::time::sleep(Duration::from_millis(10)).await;
        let snapshot = fanout.targets_snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
    }

    #[tokio::test]
    async fn unregister_removes_the_target() {
        let service = crate::services::task_service::tests::in_memory_service();
        let fanout = Arc::new(FanOut::new(service).unwrap());
        let id = fanout.register("http://127.0.0.1:0/hook", "runner-1", "a".repeat(64)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(fanout.unregister(id).await);
        assert!(fanout.targets_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn heartbeat_on_unknown_target_returns_false() {
        let service = crate::services::task_service::tests::in_memory_service();
        let fanout = Arc::new(FanOut::new(service).unwrap());
        assert!(!fanout.heartbeat(Uuid::new_v4()).await);
    }
}
