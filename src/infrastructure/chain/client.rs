//! Chain client: the single routing point through which every contract
//! call passes the SHA-256-hex `device_id_hash` form (spec.md §9).
//!
//! Grounded on the pack's keeper-bot reference: `Provider<Http>` wrapped in
//! `SignerMiddleware` then `NonceManagerMiddleware`, shared behind an `Arc`.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use ethers::middleware::{NonceManagerMiddleware, SignerMiddleware};
use ethers::providers::{Http, Middleware, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, U256};

use super::contract::StakeRegistry;

pub type ChainMiddleware = NonceManagerMiddleware<SignerMiddleware<Provider<Http>, LocalWallet>>;

/// Holds the signer-wrapped provider and the typed contract binding.
#[derive(Clone)]
pub struct ChainClient {
    contract: StakeRegistry<ChainMiddleware>,
    client: Arc<ChainMiddleware>,
}

impl ChainClient {
    pub async fn connect(
        rpc_url: &str,
        chain_id: u64,
        stake_wallet_address: &str,
        wallet: LocalWallet,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .with_context(|| format!("invalid chain RPC URL: {rpc_url}"))?;
        let wallet = wallet.with_chain_id(chain_id);
        let address = wallet.address();

        let signer = SignerMiddleware::new(provider, wallet);
        let client = Arc::new(NonceManagerMiddleware::new(signer, address));

        let contract_address = Address::from_str(stake_wallet_address)
            .with_context(|| format!("invalid stake_wallet_address: {stake_wallet_address}"))?;
        let contract = StakeRegistry::new(contract_address, client.clone());

        Ok(Self { contract, client })
    }

    pub fn signer_address(&self) -> Address {
        self.client.address()
    }

    /// `getStakeInfo(deviceIdHash)`.
    pub async fn stake_info(&self, device_id_hash: &str) -> Result<(U256, Address, bool)> {
        let hash = device_id_hash_to_bytes32(device_id_hash)?;
        let (amount, staker, exists) = self.contract.get_stake_info(hash).call().await?;
        Ok((amount, staker, exists))
    }

    /// `getBalanceByDeviceId(deviceIdHash)`.
    pub async fn balance(&self, device_id_hash: &str) -> Result<U256> {
        let hash = device_id_hash_to_bytes32(device_id_hash)?;
        let balance = self.contract.get_balance_by_device_id(hash).call().await?;
        Ok(balance)
    }

    /// `stake(deviceIdHash, amountBase)`, submitted and awaited for
    /// inclusion — the `stake` CLI subcommand's only call.
    pub async fn stake(&self, device_id_hash: &str, amount_base: U256) -> Result<()> {
        let hash = device_id_hash_to_bytes32(device_id_hash)?;
        let call = self.contract.stake(hash, amount_base);
        let pending = call.send().await.context("stake submission failed")?;
        pending.await.context("stake transaction did not confirm")?;
        Ok(())
    }

    /// `transferPayment(creatorDeviceId, runnerDeviceId, amountBase)`,
    /// submitted and awaited for inclusion.
    pub async fn transfer_payment(
        &self,
        creator_device_id_hash: &str,
        runner_device_id_hash: &str,
        amount_base: U256,
    ) -> Result<()> {
        let creator = device_id_hash_to_bytes32(creator_device_id_hash)?;
        let runner = device_id_hash_to_bytes32(runner_device_id_hash)?;
        let call = self.contract.transfer_payment(creator, runner, amount_base);
        let pending = call.send().await.context("transferPayment submission failed")?;
        pending
            .await
            .context("transferPayment transaction did not confirm")?;
        Ok(())
    }
}

fn device_id_hash_to_bytes32(device_id_hash: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(device_id_hash)
        .with_context(|| format!("device_id_hash is not valid hex: {device_id_hash}"))?;
    bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("device_id_hash must decode to exactly 32 bytes"))
}
