//! `runnerd balance`: read-only stake/balance query (spec.md §6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use ethers::types::U256;
use serde::Serialize;
use serde_json::json;

use crate::cli::output::table::render_fields;
use crate::cli::output::{output, CommandOutput};
use crate::domain::device::device_id_hash;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::{device, keystore};

#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    pub address: String,
    pub balance_base_units: String,
}

impl CommandOutput for BalanceOutput {
    fn to_human(&self) -> String {
        render_fields(
            &[
                ("address", self.address.clone()),
                ("balance_base_units", self.balance_base_units.clone()),
            ],
            Some("balance_base_units"),
        )
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "address": self.address, "balance_base_units": self.balance_base_units })
    }
}

pub async fn handle_balance(config: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config = match config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    ConfigLoader::require_chain_addresses(&config)?;

    let config_dir = device::config_dir().context("could not resolve config directory")?;
    let wallet = keystore::load(&config_dir)?;
    let device_fingerprint = device::load_or_generate(&config_dir)?;

    let client = ChainClient::connect(
        &config.chain.rpc_url,
        config.chain.chain_id,
        &config.chain.stake_wallet_address,
        wallet,
    )
    .await?;

    let hash = device_id_hash(&device_fingerprint);
    let balance: U256 = client.balance(&hash).await?;

    output(
        &BalanceOutput {
            address: format!("{:#x}", client.signer_address()),
            balance_base_units: balance.to_string(),
        },
        json_mode,
    );
    Ok(())
}
