//! Content-address log storage port.
//!
//! Treated as an opaque collaborator per spec.md §1: an uploader that
//! returns an immutable content identifier. Upload failure never fails the
//! task (spec.md §4.7 step 8) — callers swallow the error and leave
//! `logs_cid` empty.

use async_trait::async_trait;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload a blob and return its content identifier.
    async fn upload(&self, blob: &[u8]) -> anyhow::Result<String>;
}
