//! Reward dispatcher port — spec.md §9's narrow capability strategy.
//!
//! Two implementations are expected: [`crate::infrastructure::chain::ChainRewardDispatcher`]
//! (submits the on-chain transfer) and a no-op used for tests and for CLI
//! paths that never construct a full task service.

use async_trait::async_trait;

use crate::domain::models::TaskResult;

#[async_trait]
pub trait RewardDispatcher: Send + Sync {
    /// Fire-and-log: failures are logged by the implementation and never
    /// propagated to the caller (spec.md §4.5 step 6, §7).
    async fn distribute_reward(&self, result: &TaskResult);
}

/// No-op dispatcher: logs at debug and returns. Used by tests and by CLI
/// subcommands (`auth`, `stake`, `balance`) that never need reward flow.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRewardDispatcher;

#[async_trait]
impl RewardDispatcher for NullRewardDispatcher {
    async fn distribute_reward(&self, result: &TaskResult) {
        tracing::debug!(task_id = %result.task_id, "null reward dispatcher: no-op");
    }
}
