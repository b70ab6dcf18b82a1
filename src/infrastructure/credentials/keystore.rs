//! Signing-key keystore: loads a private key from an environment variable
//! or an interactive prompt, then persists it to disk with owner-only
//! permissions so subsequent `runnerd` invocations don't re-prompt
//! (spec.md §4.5/§6 `auth` subcommand).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ethers::signers::LocalWallet;

const KEY_FILE: &str = "signing_key";
const KEY_ENV_VAR: &str = "RUNNERD_PRIVATE_KEY";

/// Load the signing key, preferring `RUNNERD_PRIVATE_KEY`, then the
/// persisted keystore file, and erroring with an actionable message if
/// neither is present — the `auth` subcommand is what populates the file.
pub fn load(config_dir: &Path) -> Result<LocalWallet> {
    if let Ok(raw) = std::env::var(KEY_ENV_VAR) {
        return parse(&raw);
    }

    let path = config_dir.join(KEY_FILE);
    if path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read keystore at {}", path.display()))?;
        return parse(raw.trim());
    }

    anyhow::bail!(
        "no signing key found: set {KEY_ENV_VAR} or run `runnerd auth` to store one in {}",
        path.display()
    )
}

/// Persist `private_key_hex` (with or without a leading `0x`) to the
/// keystore file, validating it parses as a wallet first.
pub fn store(config_dir: &Path, private_key_hex: &str) -> Result<LocalWallet> {
    let wallet = parse(private_key_hex)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::create_dir_all(config_dir)
            .with_context(|| format!("failed to create {}", config_dir.display()))?;
        let path = config_dir.join(KEY_FILE);
        fs::write(&path, private_key_hex.trim()).context("failed to persist signing key")?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("failed to restrict keystore permissions")?;
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(config_dir)
            .with_context(|| format!("failed to create {}", config_dir.display()))?;
        let path = config_dir.join(KEY_FILE);
        fs::write(&path, private_key_hex.trim()).context("failed to persist signing key")?;
    }

    Ok(wallet)
}

fn parse(raw: &str) -> Result<LocalWallet> {
    let trimmed = raw.trim().trim_start_matches("0x");
    trimmed
        .parse::<LocalWallet>()
        .context("signing key is not a valid secp256k1 private key")
}
