//! Shared fakes and app-builder for HTTP-level integration tests. Mirrors
//! the in-memory collaborators already used by the unit tests in
//! `services::task_service` and `services::result_handler`, but built from
//! outside the crate against its public port traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{Address, U256};
use tokio::sync::Mutex;
use uuid::Uuid;

use runnerd::domain::errors::DomainResult;
use runnerd::domain::models::{Task, TaskResult, TaskStatus};
use runnerd::domain::ports::{NullRewardDispatcher, RewardDispatcher, StakeInfo, StakeOracle, TaskRepository, TaskResultRepository};
use runnerd::http::{self, AppState};
use runnerd::infrastructure::push::FanOut;
use runnerd::services::TaskService;

#[derive(Default)]
pub struct InMemoryTaskRepo {
    tasks: Mutex<HashMap<Uuid, Task>>,
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepo {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        self.tasks.lock().await.insert(task.id, task.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
        Ok(self.tasks.lock().await.get(&id).cloned())
    }

    async fn assign(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == TaskStatus::Pending {
                task.status = TaskStatus::Running;
                task.runner_id = Some(runner_id.to_string());
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn complete(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == TaskStatus::Running && task.runner_id.as_deref() == Some(runner_id) {
                task.status = TaskStatus::Completed;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn fail(&self, id: Uuid) -> DomainResult<bool> {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(&id) {
            if !task.status.is_terminal() {
                task.status = TaskStatus::Failed;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn reclaim(&self, id: Uuid) -> DomainResult<bool> {
        let mut tasks = self.tasks.lock().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == TaskStatus::Running {
                task.status = TaskStatus::Pending;
                task.runner_id = None;
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn list_by_status(&self, status: TaskStatus) -> DomainResult<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .await
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> DomainResult<Vec<Task>> {
        Ok(self.tasks.lock().await.values().cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryResultRepo {
    results: Mutex<HashMap<Uuid, TaskResult>>,
}

#[async_trait]
impl TaskResultRepository for InMemoryResultRepo {
    async fn create(&self, result: &TaskResult) -> DomainResult<()> {
        self.results.lock().await.insert(result.task_id, result.clone());
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>> {
        Ok(self.results.lock().await.get(&task_id).cloned())
    }
}

/// A [`StakeOracle`] whose every device is staked at a fixed amount,
/// letting tests exercise the admission gate's pass/fail edges directly.
pub struct FixedStake(pub U256);

#[async_trait]
impl StakeOracle for FixedStake {
    async fn stake_info(&self, _device_id_hash: &str) -> DomainResult<StakeInfo> {
        Ok(StakeInfo {
            amount: self.0,
            staker: Address::zero(),
            exists: true,
        })
    }

    async fn balance(&self, _device_id_hash: &str) -> DomainResult<U256> {
        Ok(self.0)
    }
}

/// Records every reward dispatched, so tests can assert on payout fan-out
/// without a real chain client.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub dispatched: Mutex<Vec<Uuid>>,
}

#[async_trait]
impl RewardDispatcher for RecordingDispatcher {
    async fn distribute_reward(&self, result: &TaskResult) {
        self.dispatched.lock().await.push(result.task_id);
    }
}

/// Build a full axum app wired the same way `cli::commands::server` wires
/// production: `FanOut::new_cyclic` breaks the `FanOut`/`TaskService`
/// construction cycle, `AppState` holds the same `Arc`s the HTTP handlers
/// see in production.
pub fn build_app(stake: U256, reward_dispatcher: Arc<dyn RewardDispatcher>) -> axum::Router {
    let task_repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepo::default());
    let result_repo = Arc::new(InMemoryResultRepo::default());
    let stake_oracle: Arc<dyn StakeOracle> = Arc::new(FixedStake(stake));

    let task_repo_for_service = Arc::clone(&task_repo);
    let stake_oracle_for_service = Arc::clone(&stake_oracle);
    let fanout = FanOut::new_cyclic(move |emitter| {
        Arc::new(TaskService::new(
            task_repo_for_service,
            result_repo,
            stake_oracle_for_service,
            emitter,
        ))
    })
    .expect("fanout construction");

    let task_service = fanout.task_service();

    let state = AppState {
        task_service,
        task_repo,
        stake_oracle,
        reward_dispatcher,
        fanout,
    };

    http::routes::build("/api", state)
}

pub fn null_dispatcher() -> Arc<dyn RewardDispatcher> {
    Arc::new(NullRewardDispatcher)
}
