//! `runnerd auth`: load a signing key and persist it to the keystore
//! (spec.md §6).

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::cli::output::table::render_fields;
use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::credentials::{device, keystore};

#[derive(Debug, Serialize)]
pub struct AuthOutput {
    pub address: String,
}

impl CommandOutput for AuthOutput {
    fn to_human(&self) -> String {
        render_fields(
            &[("status", "stored".to_string()), ("address", self.address.clone())],
            Some("address"),
        )
    }

    fn to_json(&self) -> serde_json::Value {
        json!({ "address": self.address })
    }
}

pub async fn handle_auth(private_key: Option<String>, _config: Option<PathBuf>, json_mode: bool) -> Result<()> {
    let config_dir = device::config_dir().context("could not resolve config directory")?;

    let private_key = match private_key.or_else(|| std::env::var("RUNNERD_PRIVATE_KEY").ok()) {
        Some(key) => key,
        None => prompt_for_key()?,
    };

    let wallet = keystore::store(&config_dir, &private_key)?;
    let address = format!("{:#x}", ethers::signers::Signer::address(&wallet));

    output(&AuthOutput { address }, json_mode);
    Ok(())
}

fn prompt_for_key() -> Result<String> {
    print!("Enter private key (hex, 0x-prefixed or not): ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read private key from stdin")?;
    Ok(line.trim().to_string())
}
