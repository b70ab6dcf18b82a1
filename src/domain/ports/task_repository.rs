//! Task repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskStatus};

/// Repository interface for Task persistence.
///
/// `assign` must be implemented as a single atomic statement (e.g. an
/// `UPDATE ... WHERE status = 'pending'` with row-count check) so that
/// concurrent assignment attempts on the same task linearize through the
/// database rather than through application-level locking — spec.md §4.1's
/// tie-break policy and §8's single-assignment property depend on this.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: &Task) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>>;

    /// Atomically transition a task from `pending` to `running` and bind
    /// `runner_id`. Returns `Ok(true)` iff this call won the race.
    async fn assign(&self, id: Uuid, runner_id: &str) -> DomainResult<bool>;

    /// Atomically transition a task from `running` to `completed`, only if
    /// `runner_id` matches the currently assigned runner.
    async fn complete(&self, id: Uuid, runner_id: &str) -> DomainResult<bool>;

    /// Atomically transition a task to `failed` from any non-terminal
    /// status (used by timeouts, executor failures, and liveness reclaim).
    async fn fail(&self, id: Uuid) -> DomainResult<bool>;

    /// Best-effort reclaim: move a `running` task whose runner went stale
    /// back to `pending` and clear `runner_id` (spec.md §4.3).
    async fn reclaim(&self, id: Uuid) -> DomainResult<bool>;

    async fn list_by_status(&self, status: TaskStatus) -> DomainResult<Vec<Task>>;

    async fn list_all(&self) -> DomainResult<Vec<Task>>;
}
