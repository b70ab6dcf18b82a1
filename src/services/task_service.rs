//! Task service: lifecycle enforcement and reward-admission gate
//! (spec.md §4.1).

use std::sync::Arc;

use ethers::types::U256;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::device::device_id_hash;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskResult, TaskStatus};
use crate::domain::ports::{StakeOracle, TaskChangeEmitter, TaskRepository, TaskResultRepository};
use crate::domain::reward;

/// Coordinates task admission, assignment, and completion against a
/// [`TaskRepository`], gates creation on a [`StakeOracle`] query, and signals
/// a [`TaskChangeEmitter`] on any task-visibility change.
///
/// Constructed once per process and shared behind an `Arc` — mirrors the
/// teacher's constructor-injection style (one service instance, built from
/// trait-object collaborators, handed into both the HTTP layer and any
/// background worker that needs it).
pub struct TaskService {
    task_repo: Arc<dyn TaskRepository>,
    result_repo: Arc<dyn TaskResultRepository>,
    stake_oracle: Arc<dyn StakeOracle>,
    emitter: Arc<dyn TaskChangeEmitter>,
}

impl TaskService {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        result_repo: Arc<dyn TaskResultRepository>,
        stake_oracle: Arc<dyn StakeOracle>,
        emitter: Arc<dyn TaskChangeEmitter>,
    ) -> Self {
        Self {
            task_repo,
            result_repo,
            stake_oracle,
            emitter,
        }
    }

    /// Admit a new task: validate structure, gate on the creator's staked
    /// balance, persist as `pending`, then signal fan-out.
    pub async fn create(&self, task: Task) -> DomainResult<Task> {
        task.validate()?;

        let hash = device_id_hash(&task.creator_device_id);
        let stake = self.stake_oracle.stake_info(&hash).await?;

        let needed = reward::to_base_units(task.reward)
            .map_err(|e| DomainError::ValidationFailed(e.to_string()))?;

        if stake.amount < needed {
            return Err(DomainError::InsufficientStake {
                have: stake.amount.to_string(),
                need: needed.to_string(),
            });
        }

        self.task_repo.create(&task).await?;
        info!(task_id = %task.id, reward = task.reward, "task created");
        self.emitter.signal();
        Ok(task)
    }

    /// Atomically transition `pending -> running`, binding `runner_id`.
    pub async fn assign(&self, task_id: Uuid, runner_id: &str) -> DomainResult<()> {
        let task = self
            .task_repo
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let won = self.task_repo.assign(task_id, runner_id).await?;
        if !won {
            return Err(DomainError::Conflict {
                id: task_id,
                status: task.status.as_str().to_string(),
                expected: TaskStatus::Pending.as_str().to_string(),
            });
        }
        info!(task_id = %task_id, runner_id = %runner_id, "task assigned");
        self.emitter.signal();
        Ok(())
    }

    /// Idempotent confirmation that the assigned runner has begun work.
    /// `running` is already set by `assign`; this just validates state.
    pub async fn start(&self, task_id: Uuid) -> DomainResult<()> {
        let task = self
            .task_repo
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;
        if task.status != TaskStatus::Running {
            return Err(DomainError::Conflict {
                id: task_id,
                status: task.status.as_str().to_string(),
                expected: TaskStatus::Running.as_str().to_string(),
            });
        }
        Ok(())
    }

    /// `running -> completed`, only by the assigned runner.
    pub async fn complete(&self, task_id: Uuid, runner_id: &str) -> DomainResult<()> {
        let won = self.task_repo.complete(task_id, runner_id).await?;
        if !won {
            let task = self
                .task_repo
                .get(task_id)
                .await?
                .ok_or(DomainError::TaskNotFound(task_id))?;
            return Err(DomainError::Conflict {
                id: task_id,
                status: task.status.as_str().to_string(),
                expected: TaskStatus::Running.as_str().to_string(),
            });
        }
        info!(task_id = %task_id, "task completed");
        self.emitter.signal();
        Ok(())
    }

    /// Persist a server-enriched result (enrichment happens in
    /// [`crate::services::result_handler`] before this is called). On
    /// failure, transitions the task to `failed`; on success, completion
    /// is left to the caller's own explicit `Complete` call (spec.md
    /// §4.1/§4.6 — completion is a distinct op the runner invokes after
    /// result submission, not a side effect of saving the result).
    pub async fn save_result(&self, result: TaskResult) -> DomainResult<TaskResult> {
        self.result_repo.create(&result).await?;
        if !result.succeeded() {
            self.task_repo.fail(result.task_id).await.ok();
        }
        self.emitter.signal();
        Ok(result)
    }

    pub async fn list_available(&self) -> DomainResult<Vec<Task>> {
        self.task_repo.list_by_status(TaskStatus::Pending).await
    }

    pub async fn get(&self, task_id: Uuid) -> DomainResult<Option<Task>> {
        self.task_repo.get(task_id).await
    }

    pub async fn get_result(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>> {
        self.result_repo.get(task_id).await
    }

    pub async fn list_all(&self) -> DomainResult<Vec<Task>> {
        self.task_repo.list_all().await
    }

    pub async fn reward_for(&self, task_id: Uuid) -> DomainResult<f64> {
        let task = self
            .task_repo
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;
        Ok(task.reward)
    }

    /// Best-effort reclaim invoked by the Liveness Monitor when a runner's
    /// target is evicted (spec.md §4.3). Not exposed over HTTP.
    pub async fn reclaim(&self, task_id: Uuid) -> DomainResult<()> {
        let reclaimed = self.task_repo.reclaim(task_id).await?;
        if reclaimed {
            warn!(task_id = %task_id, "reclaimed task from evicted runner");
            self.emitter.signal();
        }
        Ok(())
    }
}

/// Whether `stake_amount` covers `reward` whole tokens (spec.md §8's
/// "staked-amount gate" property), exposed standalone for unit testing
/// without a full repository/emitter stack.
pub fn stake_covers_reward(stake_amount: U256, reward: f64) -> anyhow::Result<bool> {
    Ok(stake_amount >= reward::to_base_units(reward)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::models::TaskResult;
    use crate::domain::ports::stake_oracle::StakeInfo;

    #[test]
    fn stake_gate_exact_match_passes() {
        let needed = reward::to_base_units(1.0).unwrap();
        assert!(stake_covers_reward(needed, 1.0).unwrap());
    }

    #[test]
    fn stake_gate_below_fails() {
        let half = reward::to_base_units(0.5).unwrap();
        assert!(!stake_covers_reward(half, 1.0).unwrap());
    }

    #[derive(Default)]
    struct InMemoryTaskRepo {
        tasks: Mutex<HashMap<Uuid, Task>>,
    }

    #[async_trait::async_trait]
    impl TaskRepository for InMemoryTaskRepo {
        async fn create(&self, task: &Task) -> DomainResult<()> {
            self.tasks.lock().unwrap().insert(task.id, task.clone());
            Ok(())
        }

        async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
            Ok(self.tasks.lock().unwrap().get(&id).cloned())
        }

        async fn assign(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().unwrap();
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
            let mut tasks = self.tasks.lock().unwrap();
            if let Some(task) = tasks.get_mut(&id) {
                if task.status == TaskStatus::Running && task.runner_id.as_deref() == Some(runner_id) {
                    task.status = TaskStatus::Completed;
                    return Ok(true);
                }
            }
            Ok(false)
        }

        async fn fail(&self, id: Uuid) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().unwrap();
            if let Some(task) = tasks.get_mut(&id) {
                if !task.status.is_terminal() {
                    task.status = TaskStatus::Failed;
                    return Ok(true);
                }
            }
            Ok(false)
        }

        async fn reclaim(&self, id: Uuid) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().unwrap();
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
                .unwrap()
                .values()
                .filter(|t| t.status == status)
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> DomainResult<Vec<Task>> {
            Ok(self.tasks.lock().unwrap().values().cloned().collect())
        }
    }

    #[derive(Default)]
    struct InMemoryResultRepo {
        results: Mutex<HashMap<Uuid, TaskResult>>,
    }

    #[async_trait::async_trait]
    impl TaskResultRepository for InMemoryResultRepo {
        async fn create(&self, result: &TaskResult) -> DomainResult<()> {
            self.results
                .lock()
                .unwrap()
                .insert(result.task_id, result.clone());
            Ok(())
        }

        async fn get(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>> {
            Ok(self.results.lock().unwrap().get(&task_id).cloned())
        }
    }

    struct AlwaysStaked;

    #[async_trait::async_trait]
    impl StakeOracle for AlwaysStaked {
        async fn stake_info(&self, _device_id_hash: &str) -> DomainResult<StakeInfo> {
            Ok(StakeInfo {
                amount: U256::MAX,
                staker: ethers::types::Address::zero(),
                exists: true,
            })
        }

        async fn balance(&self, _device_id_hash: &str) -> DomainResult<U256> {
            Ok(U256::MAX)
        }
    }

    struct NoopEmitter;

    impl TaskChangeEmitter for NoopEmitter {
        fn signal(&self) {}
    }

    /// Build a fully in-memory [`TaskService`] (no database, no chain, no
    /// fan-out) for components whose tests only need realistic lifecycle
    /// behavior, not a real repository.
    pub(crate) fn in_memory_service() -> Arc<TaskService> {
        Arc::new(TaskService::new(
            Arc::new(InMemoryTaskRepo::default()),
            Arc::new(InMemoryResultRepo::default()),
            Arc::new(AlwaysStaked),
            Arc::new(NoopEmitter),
        ))
    }

    /// A minimal valid docker task for tests outside this module that only
    /// need a task to flow through the lifecycle, not exercise validation.
    pub(crate) fn sample_docker_task(creator_device_id: &str) -> Task {
        use crate::domain::models::{DockerConfig, DockerEnvironment};

        Task::new_docker(
            Uuid::new_v4(),
            creator_device_id,
            ethers::types::Address::zero(),
            DockerEnvironment {
                image: "alpine:3".to_string(),
                workdir: "/w".to_string(),
                env: vec![],
            },
            DockerConfig {
                command: vec!["echo".to_string(), "ok".to_string()],
            },
            1.0,
        )
        .unwrap()
    }
}
