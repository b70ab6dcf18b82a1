//! [`StakeOracle`] backed by the on-chain stake registry.

use async_trait::async_trait;
use ethers::types::U256;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{StakeInfo, StakeOracle};

use super::client::ChainClient;

pub struct ChainStakeOracle {
    client: ChainClient,
}

impl ChainStakeOracle {
    pub fn new(client: ChainClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StakeOracle for ChainStakeOracle {
    async fn stake_info(&self, device_id_hash: &str) -> DomainResult<StakeInfo> {
        let (amount, staker, exists) = self
            .client
            .stake_info(device_id_hash)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))?;
        Ok(StakeInfo {
            amount,
            staker,
            exists,
        })
    }

    async fn balance(&self, device_id_hash: &str) -> DomainResult<U256> {
        self.client
            .balance(device_id_hash)
            .await
            .map_err(|e| DomainError::Infrastructure(e.to_string()))
    }
}
