//! Device fingerprint: a random 32-byte identity generated once and
//! persisted to disk with owner-only permissions (spec.md §4.6).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rand::RngCore;

const FINGERPRINT_FILE: &str = "device_id";

/// Resolve the per-user config directory for this application
/// (`~/.config/runnerd` on Linux, platform-equivalent elsewhere).
pub fn config_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "runnerd")
        .context("could not determine a home directory for the current user")?;
    Ok(dirs.config_dir().to_path_buf())
}

/// Load the device fingerprint from `config_dir`, generating and
/// persisting one on first run.
pub fn load_or_generate(config_dir: &Path) -> Result<String> {
    let path = config_dir.join(FINGERPRINT_FILE);
    if path.exists() {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read device fingerprint at {}", path.display()))?;
        let fingerprint = contents.trim().to_string();
        validate(&fingerprint)?;
        return Ok(fingerprint);
    }

    let fingerprint = generate();
    persist(config_dir, &fingerprint)?;
    Ok(fingerprint)
}

fn generate() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn validate(fingerprint: &str) -> Result<()> {
    if fingerprint.len() != 64 || !fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("persisted device fingerprint is corrupt (expected 64 hex chars)");
    }
    Ok(())
}

#[cfg(unix)]
fn persist(config_dir: &Path, fingerprint: &str) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    let path = config_dir.join(FINGERPRINT_FILE);
    fs::write(&path, fingerprint).context("failed to persist device fingerprint")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
        .context("failed to restrict device fingerprint permissions")?;
    Ok(())
}

#[cfg(not(unix))]
fn persist(config_dir: &Path, fingerprint: &str) -> Result<()> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    let path = config_dir.join(FINGERPRINT_FILE);
    fs::write(&path, fingerprint).context("failed to persist device fingerprint")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generates_and_persists_on_first_run() {
        let dir = tempdir().unwrap();
        let fingerprint = load_or_generate(dir.path()).unwrap();
        assert_eq!(fingerprint.len(), 64);
        assert!(dir.path().join(FINGERPRINT_FILE).exists());
    }

    #[test]
    fn reloads_same_fingerprint_on_second_run() {
        let dir = tempdir().unwrap();
        let first = load_or_generate(dir.path()).unwrap();
        let second = load_or_generate(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn persisted_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        load_or_generate(dir.path()).unwrap();
        let meta = fs::metadata(dir.path().join(FINGERPRINT_FILE)).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn rejects_corrupt_fingerprint() {
        assert!(validate("not-hex").is_err());
        assert!(validate(&"a".repeat(64)).is_ok());
    }
}
