//! Container executor port.
//!
//! Abstracts the Container Executor (spec.md §4.7) behind a trait so the
//! Runner Agent and its tests can substitute a mock instead of talking to a
//! real container runtime.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::models::{ResourceUsage, Task};

/// Outcome of running one task to completion (or to a fatal failure).
///
/// `exit_code` is `-1` when the wait itself errored (spec.md §4.7 step 6).
/// `error` carries log-fetch or upload failures that do not change the
/// exit code (spec.md's failure semantics: "Log-fetch failures are recorded
/// into result.error but the exit code is still returned").
#[derive(Debug, Clone, Default)]
pub struct ExecutionOutcome {
    pub exit_code: i64,
    pub output: String,
    pub execution_time_ns: u64,
    pub resources: ResourceUsage,
    pub logs_cid: Option<String>,
    pub error: Option<String>,
}

#[async_trait]
pub trait ContainerExecutor: Send + Sync {
    /// Run `task` to completion. Returns `Ok(None)` when image-pull,
    /// container-create, or container-start errors are fatal to the task
    /// (spec.md §4.7: "result is nil, dispatcher will see no submission").
    async fn execute(
        &self,
        task: &Task,
        cancel: CancellationToken,
    ) -> anyhow::Result<Option<ExecutionOutcome>>;
}
