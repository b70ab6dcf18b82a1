//! Task domain model: the unit of reward-backed work offered to runners.

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Lifecycle status of a task.
///
/// Transitions are monotonic: `pending -> running -> {completed, failed}`.
/// `completed` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> &'static [TaskStatus] {
        match self {
            Self::Pending => &[Self::Running, Self::Failed],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed => &[],
            Self::Failed => &[],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Kind of work a task represents. Only `Docker` is executed end-to-end by
/// the Container Executor; `Command` and `File` are admitted and persisted
/// but rejected at assignment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Docker,
    Command,
    File,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Command => "command",
            Self::File => "file",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "docker" => Some(Self::Docker),
            "command" => Some(Self::Command),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Parsed view of `environment` for a docker task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerEnvironment {
    pub image: String,
    pub workdir: String,
    #[serde(default)]
    pub env: Vec<String>,
}

impl DockerEnvironment {
    fn validate(&self) -> DomainResult<()> {
        if self.image.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "environment.image must be non-empty".to_string(),
            ));
        }
        if !self.workdir.starts_with('/') || self.workdir.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "environment.workdir must be a non-empty absolute path".to_string(),
            ));
        }
        for kv in &self.env {
            if !kv.contains('=') {
                return Err(DomainError::ValidationFailed(format!(
                    "environment entry {kv:?} is not KEY=VALUE"
                )));
            }
        }
        Ok(())
    }
}

/// Parsed view of `config` for a docker task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
    pub command: Vec<String>,
}

/// A unit of reward-backed work offered to runners.
///
/// `config` and `environment` are kept as opaque JSON documents at rest
/// (matching spec) and parsed into [`DockerConfig`]/[`DockerEnvironment`]
/// on demand for docker tasks via [`Task::docker_config`]/
/// [`Task::docker_environment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub creator_device_id: String,
    pub creator_address: Address,
    pub task_type: TaskType,
    pub config: Value,
    pub environment: Value,
    pub reward: f64,
    pub status: TaskStatus,
    pub runner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Incremented on every transition — observability only, not a new
    /// invariant; the state machine above remains authoritative.
    pub version: u64,
}

impl Task {
    /// Build a new pending docker task.
    pub fn new_docker(
        creator_id: Uuid,
        creator_device_id: impl Into<String>,
        creator_address: Address,
        environment: DockerEnvironment,
        config: DockerConfig,
        reward: f64,
    ) -> DomainResult<Self> {
        let now = Utc::now();
        let task = Self {
            id: Uuid::new_v4(),
            creator_id,
            creator_device_id: creator_device_id.into(),
            creator_address,
            task_type: TaskType::Docker,
            config: serde_json::to_value(&config)?,
            environment: serde_json::to_value(&environment)?,
            reward,
            status: TaskStatus::default(),
            runner_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            version: 0,
        };
        task.validate()?;
        Ok(task)
    }

    /// Structural validation: reward non-negative; for docker tasks,
    /// `environment.image`/`environment.workdir` non-empty and `config.command`
    /// non-empty.
    pub fn validate(&self) -> DomainResult<()> {
        if self.reward < 0.0 {
            return Err(DomainError::ValidationFailed(
                "reward must be non-negative".to_string(),
            ));
        }
        if self.creator_device_id.len() != 64
            || !self.creator_device_id.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(DomainError::ValidationFailed(
                "creator_device_id must be a 64-hex fingerprint".to_string(),
            ));
        }
        if self.task_type == TaskType::Docker {
            let env = self.docker_environment()?;
            env.validate()?;
            let cfg = self.docker_config()?;
            if cfg.command.is_empty() {
                return Err(DomainError::ValidationFailed(
                    "config.command must be a non-empty argv list".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn docker_environment(&self) -> DomainResult<DockerEnvironment> {
        serde_json::from_value(self.environment.clone())
            .map_err(|e| DomainError::ValidationFailed(format!("invalid environment: {e}")))
    }

    pub fn docker_config(&self) -> DomainResult<DockerConfig> {
        serde_json::from_value(self.config.clone())
            .map_err(|e| DomainError::ValidationFailed(format!("invalid config: {e}")))
    }

    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        self.status.can_transition_to(new_status)
    }

    /// Transition to a new status, enforcing the state machine.
    pub fn transition_to(&mut self, new_status: TaskStatus) -> DomainResult<()> {
        if !self.can_transition_to(new_status) {
            return Err(DomainError::Conflict {
                id: self.id,
                status: self.status.as_str().to_string(),
                expected: format!("one of {:?}", self.status.valid_transitions()),
            });
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        self.version += 1;
        if new_status.is_terminal() {
            self.completed_at = Some(self.updated_at);
        }
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
