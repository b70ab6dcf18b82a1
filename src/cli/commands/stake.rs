//! `runnerd stake`: submit an on-chain stake transaction for the loaded
//! key (spec.md §6).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::cli::output::table::render_fields;
use crate::cli::output::{output, CommandOutput};
use crate::domain::device::device_id_hash;
use crate::domain::reward::to_base_units;
use crate::infrastructure::chain::ChainClient;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::{device, keystore};

#[derive(Debug, Serialize)]
pub struct StakeOutput {
    pub amount: f64,
    pub address: String,
}

impl CommandOutput for StakeOutput {
    fn to_human(&self) -> String {
        render_fields(
            &[
                ("amount", self.amount.to_string()),
                ("address", self.address.clone()),
            ],
            Some("amount"),
        )
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "amount": self.amount, "address": self.address })
    }
}

pub async fn handle_stake(amount: f64, config: Option<PathBuf>, json_mode: bool) -> Result<()> {
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

    let amount_base = to_base_units(amount)?;
    let hash = device_id_hash(&device_fingerprint);
    client.stake(&hash, amount_base).await?;

    let address = format!("{:#x}", client.signer_address());
    output(&StakeOutput { amount, address }, json_mode);
    Ok(())
}
