//! Stake oracle port: read-only view onto the on-chain stake contract.
//!
//! Every call takes the SHA-256-hex `device_id_hash`, never a raw device
//! fingerprint — this is the single routing point spec.md §9 calls for to
//! resolve the device-ID vs device-ID-hash inconsistency.

use async_trait::async_trait;
use ethers::types::{Address, U256};

use crate::domain::errors::DomainResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeInfo {
    pub amount: U256,
    pub staker: Address,
    pub exists: bool,
}

#[async_trait]
pub trait StakeOracle: Send + Sync {
    /// `getStakeInfo(deviceIdHash)`.
    async fn stake_info(&self, device_id_hash: &str) -> DomainResult<StakeInfo>;

    /// `getBalanceByDeviceId(deviceIdHash)`.
    async fn balance(&self, device_id_hash: &str) -> DomainResult<U256>;
}
