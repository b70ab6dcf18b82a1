//! Result enrichment: turns an untrusted [`TaskResultSubmission`] into a
//! trustworthy [`TaskResult`] (spec.md §4.4).
//!
//! This is deliberately a free function rather than a method on
//! [`crate::services::task_service::TaskService`] — it needs the requesting
//! runner's identity (device id + signed address), which arrives via the
//! HTTP layer, not the domain layer, so it lives at the seam between them.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::device::device_id_hash;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskResult, TaskResultSubmission};
use crate::domain::ports::{RewardDispatcher, TaskRepository};
use crate::services::task_service::TaskService;

/// Identity asserted by the runner submitting a result, taken from
/// authenticated request context (spec.md §4.4 step 1) rather than from the
/// submission body.
pub struct RunnerIdentity {
    pub device_id: String,
}

/// Validate, enrich, persist a submission, and conditionally dispatch the
/// reward. Returns the persisted [`TaskResult`].
pub async fn handle_submission(
    task_repo: &Arc<dyn TaskRepository>,
    task_service: &TaskService,
    reward_dispatcher: &Arc<dyn RewardDispatcher>,
    identity: RunnerIdentity,
    submission: TaskResultSubmission,
) -> DomainResult<TaskResult> {
    if !submission.resources.is_valid() {
        return Err(DomainError::ValidationFailed(
            "resources must be non-negative".to_string(),
        ));
    }

    let task: Task = task_repo
        .get(submission.task_id)
        .await?
        .ok_or_else(|| {
            DomainError::Infrastructure(format!(
                "task {} missing at result submission",
                submission.task_id
            ))
        })?;

    if task.runner_id.as_deref() != Some(identity.device_id.as_str()) {
        warn!(
            task_id = %task.id,
            submitting_device = %identity.device_id,
            assigned = ?task.runner_id,
            "result submitted by a runner other than the assigned one"
        );
        return Err(DomainError::Conflict {
            id: task.id,
            status: "not-assigned-runner".to_string(),
            expected: task.runner_id.clone().unwrap_or_default(),
        });
    }

    let device_id_hash = device_id_hash(&identity.device_id);

    // Server-owned fields overwrite whatever the client sent (spec.md §4.4
    // step 5): task_id, creator_address, creator_device_id, reward come
    // from the stored task; runner_address and device_id_hash are derived
    // from the authenticated device_id, never the submission.
    let result = TaskResult {
        task_id: task.id,
        device_id: identity.device_id.clone(),
        device_id_hash,
        creator_address: task.creator_address,
        creator_device_id: task.creator_device_id.clone(),
        runner_address: identity.device_id,
        exit_code: submission.exit_code,
        output: submission.output,
        execution_time_ns: submission.execution_time_ns,
        resources: submission.resources,
        logs_cid: submission.logs_cid,
        reward: task.reward,
        created_at: chrono::Utc::now(),
    };

    let persisted = task_service.save_result(result).await?;

    if persisted.succeeded() {
        // distribute_reward never returns an error to the caller — failures
        // are logged by the implementation (spec.md §4.5 step 6) so a flaky
        // chain RPC can't unwind an already-persisted result.
        reward_dispatcher.distribute_reward(&persisted).await;
        info!(task_id = %persisted.task_id, reward = persisted.reward, "reward dispatch requested");
    }

    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use ethers::types::Address;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use super::*;
    use crate::domain::models::{DockerConfig, DockerEnvironment, ResourceUsage, TaskStatus};
    use crate::domain::ports::{StakeInfo, StakeOracle, TaskChangeEmitter, TaskResultRepository};

    struct InMemoryTaskRepo {
        tasks: Mutex<Vec<Task>>,
    }

    #[async_trait]
    impl TaskRepository for InMemoryTaskRepo {
        async fn create(&self, task: &Task) -> DomainResult<()> {
            self.tasks.lock().await.push(task.clone());
            Ok(())
        }
        async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
            Ok(self.tasks.lock().await.iter().find(|t| t.id == id).cloned())
        }
        async fn assign(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().await;
            if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
                if t.status == TaskStatus::Pending {
                    t.status = TaskStatus::Running;
                    t.runner_id = Some(runner_id.to_string());
                    return Ok(true);
                }
            }
            Ok(false)
        }
        async fn complete(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().await;
            if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
                if t.status == TaskStatus::Running && t.runner_id.as_deref() == Some(runner_id) {
                    t.status = TaskStatus::Completed;
                    return Ok(true);
                }
            }
            Ok(false)
        }
        async fn fail(&self, id: Uuid) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().await;
            if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
                t.status = TaskStatus::Failed;
                return Ok(true);
            }
            Ok(false)
        }
        async fn reclaim(&self, id: Uuid) -> DomainResult<bool> {
            let mut tasks = self.tasks.lock().await;
            if let Some(t) = tasks.iter_mut().find(|t| t.id == id) {
                t.status = TaskStatus::Pending;
                t.runner_id = None;
                return Ok(true);
            }
            Ok(false)
        }
        async fn list_by_status(&self, status: TaskStatus) -> DomainResult<Vec<Task>> {
            Ok(self
                .tasks
                .lock()
                .await
                .iter()
                .filter(|t| t.status == status)
                .cloned()
                .collect())
        }
        async fn list_all(&self) -> DomainResult<Vec<Task>> {
            Ok(self.tasks.lock().await.clone())
        }
    }

    struct InMemoryResultRepo {
        results: Mutex<Vec<TaskResult>>,
    }

    #[async_trait]
    impl TaskResultRepository for InMemoryResultRepo {
        async fn create(&self, result: &TaskResult) -> DomainResult<()> {
            self.results.lock().await.push(result.clone());
            Ok(())
        }
        async fn get(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>> {
            Ok(self
                .results
                .lock()
                .await
                .iter()
                .find(|r| r.task_id == task_id)
                .cloned())
        }
    }

    struct AlwaysStaked;

    #[async_trait]
    impl StakeOracle for AlwaysStaked {
        async fn stake_info(&self, _device_id_hash: &str) -> DomainResult<StakeInfo> {
            Ok(StakeInfo {
                amount: ethers::types::U256::MAX,
                staker: Address::zero(),
                exists: true,
            })
        }
        async fn balance(&self, _device_id_hash: &str) -> DomainResult<ethers::types::U256> {
            Ok(ethers::types::U256::MAX)
        }
    }

    struct NoopEmitter;
    impl TaskChangeEmitter for NoopEmitter {
        fn signal(&self) {}
    }

    struct RecordingDispatcher {
        dispatched: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl RewardDispatcher for RecordingDispatcher {
        async fn distribute_reward(&self, result: &TaskResult) {
            self.dispatched.lock().await.push(result.task_id);
        }
    }

    fn sample_task() -> Task {
        Task::new_docker(
            Uuid::new_v4(),
            "a".repeat(64),
            Address::zero(),
            DockerEnvironment {
                image: "alpine:3".to_string(),
                workdir: "/w".to_string(),
                env: vec![],
            },
            DockerConfig {
                command: vec!["echo".to_string()],
            },
            1.0,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn successful_submission_overwrites_untrusted_fields_and_dispatches_reward() {
        let task_repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepo {
            tasks: Mutex::new(vec![]),
        });
        let result_repo: Arc<dyn TaskResultRepository> = Arc::new(InMemoryResultRepo {
            results: Mutex::new(vec![]),
        });
        let stake_oracle: Arc<dyn StakeOracle> = Arc::new(AlwaysStaked);
        let emitter: Arc<dyn TaskChangeEmitter> = Arc::new(NoopEmitter);
        let dispatcher = Arc::new(RecordingDispatcher {
            dispatched: Mutex::new(vec![]),
        });
        let reward_dispatcher: Arc<dyn RewardDispatcher> = dispatcher.clone();

        let service = TaskService::new(
            task_repo.clone(),
            result_repo.clone(),
            stake_oracle,
            emitter,
        );

        let task = sample_task();
        let task_id = task.id;
        let created = service.create(task).await.unwrap();
        task_repo.assign(task_id, "a".repeat(64).as_str()).await.unwrap();

        let submission = TaskResultSubmission {
            task_id,
            exit_code: 0,
            output: "hi".to_string(),
            execution_time_ns: 42,
            resources: ResourceUsage::default(),
            logs_cid: None,
        };
        let identity = RunnerIdentity {
            device_id: "a".repeat(64),
        };

        let result = handle_submission(&task_repo, &service, &reward_dispatcher, identity, submission)
            .await
            .unwrap();

        assert_eq!(result.reward, created.reward);
        assert_eq!(result.creator_address, created.creator_address);
        assert_eq!(dispatcher.dispatched.lock().await.len(), 1);

        // submission alone does not complete the task; that's a distinct op
        // the runner invokes afterwards (spec.md §4.1/§4.6).
        let stored = task_repo.get(task_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Running);

        service.complete(task_id, "a".repeat(64).as_str()).await.unwrap();
        let stored = task_repo.get(task_id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn submission_from_wrong_runner_is_rejected() {
        let task_repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepo {
            tasks: Mutex::new(vec![]),
        });
        let result_repo: Arc<dyn TaskResultRepository> = Arc::new(InMemoryResultRepo {
            results: Mutex::new(vec![]),
        });
        let stake_oracle: Arc<dyn StakeOracle> = Arc::new(AlwaysStaked);
        let emitter: Arc<dyn TaskChangeEmitter> = Arc::new(NoopEmitter);
        let reward_dispatcher: Arc<dyn RewardDispatcher> = Arc::new(RecordingDispatcher {
            dispatched: Mutex::new(vec![]),
        });

        let service = TaskService::new(
            task_repo.clone(),
            result_repo.clone(),
            stake_oracle,
            emitter,
        );

        let task = sample_task();
        let task_id = task.id;
        service.create(task).await.unwrap();
        task_repo.assign(task_id, "a".repeat(64).as_str()).await.unwrap();

        let submission = TaskResultSubmission {
            task_id,
            exit_code: 0,
            output: String::new(),
            execution_time_ns: 1,
            resources: ResourceUsage::default(),
            logs_cid: None,
        };
        let identity = RunnerIdentity {
            device_id: "c".repeat(64),
        };

        let err = handle_submission(&task_repo, &service, &reward_dispatcher, identity, submission)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }
}
