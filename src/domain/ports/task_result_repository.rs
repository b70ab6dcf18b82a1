//! Task result repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::TaskResult;

#[async_trait]
pub trait TaskResultRepository: Send + Sync {
    async fn create(&self, result: &TaskResult) -> DomainResult<()>;

    async fn get(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>>;
}
