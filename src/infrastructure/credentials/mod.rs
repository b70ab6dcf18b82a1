//! Credentials management infrastructure
//!
//! - Device fingerprint generation and persistence (owner-only file perms)
//! - Signing-key keystore backing the `auth`/`stake` CLI paths

pub mod device;
pub mod keystore;
