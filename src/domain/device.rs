//! Device fingerprint hashing: `device_id_hash = hex(SHA-256(device_id))`.
//!
//! This is the one place the hash is computed so every contract call and
//! every persisted [`crate::domain::models::TaskResult`] agrees (spec.md §8
//! "device-hash round-trip").

use sha2::{Digest, Sha256};

pub fn device_id_hash(device_id: &str) -> String {
    let digest = Sha256::digest(device_id.as_bytes());
    hex::encode(digest)
}
