//! [`RewardDispatcher`] that submits the on-chain transfer (spec.md §4.5).

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::device::device_id_hash;
use crate::domain::models::TaskResult;
use crate::domain::ports::RewardDispatcher;
use crate::domain::reward::to_base_units;

use super::client::ChainClient;

pub struct ChainRewardDispatcher {
    client: ChainClient,
}

impl ChainRewardDispatcher {
    pub fn new(client: ChainClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RewardDispatcher for ChainRewardDispatcher {
    async fn distribute_reward(&self, result: &TaskResult) {
        let runner_hash = device_id_hash(&result.device_id);

        // Step 3: unstaked runners earn nothing — not an error, just a no-op.
        let balance = match self.client.balance(&runner_hash).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(task_id = %result.task_id, error = %e, "stake balance query failed, skipping reward");
                return;
            }
        };
        if balance.is_zero() {
            info!(task_id = %result.task_id, runner = %result.device_id, "runner has no stake, no reward owed");
            return;
        }

        let amount_base = match to_base_units(result.reward) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(task_id = %result.task_id, error = %e, "invalid reward amount, skipping dispatch");
                return;
            }
        };

        let creator_hash = device_id_hash(&result.creator_device_id);
        match self
            .client
            .transfer_payment(&creator_hash, &runner_hash, amount_base)
            .await
        {
            Ok(()) => info!(task_id = %result.task_id, amount_base = %amount_base, "reward transferred"),
            Err(e) => warn!(task_id = %result.task_id, error = %e, "reward transfer failed"),
        }
    }
}
