//! TaskResult domain model: one per successful assignment attempt.

use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource metering captured by the Container Executor while a task runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_seconds: f64,
    pub estimated_cycles: f64,
    pub memory_gb_hours: f64,
    pub storage_gb: f64,
    pub network_data_gb: f64,
}

impl ResourceUsage {
    /// All metered fields must be non-negative — a negative sample means
    /// the metering collector observed a counter rollover or a bug.
    pub fn is_valid(&self) -> bool {
        self.cpu_seconds >= 0.0
            && self.estimated_cycles >= 0.0
            && self.memory_gb_hours >= 0.0
            && self.storage_gb >= 0.0
            && self.network_data_gb >= 0.0
    }
}

/// Body submitted by a runner at `POST /runners/tasks/{id}/result`.
///
/// Every field here is untrusted client input. The fields that determine
/// payee and amount (`task_id`, `creator_address`, `creator_device_id`,
/// `reward`, `runner_address`, `device_id_hash`) are discarded and replaced
/// server-side by [`crate::services::result_handler`] before persistence —
/// see spec.md §4.4 step 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResultSubmission {
    pub task_id: Uuid,
    pub exit_code: i64,
    pub output: String,
    pub execution_time_ns: u64,
    #[serde(default)]
    pub resources: ResourceUsage,
    #[serde(default)]
    pub logs_cid: Option<String>,
}

/// The persisted, server-enriched result of one assignment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: Uuid,
    pub device_id: String,
    pub device_id_hash: String,
    pub creator_address: Address,
    pub creator_device_id: String,
    pub runner_address: String,
    pub exit_code: i64,
    pub output: String,
    pub execution_time_ns: u64,
    pub resources: ResourceUsage,
    pub logs_cid: Option<String>,
    pub reward: f64,
    pub created_at: DateTime<Utc>,
}

impl TaskResult {
    /// Whether the task succeeded (drives reward dispatch in §4.4 step 7).
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
