//! HTTP-backed [`ContentStore`]: uploads a log blob to a content-addressed
//! object store and returns the hash that addresses it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use sha2::{Digest, Sha256};

use crate::domain::ports::ContentStore;

/// Uploads blobs to an HTTP endpoint that accepts a PUT at
/// `{base_url}/{cid}` and is content-addressed by sha256 digest.
///
/// The store is an opaque collaborator (spec.md §1): this adapter only
/// needs to agree with it on addressing scheme, not implement storage
/// itself.
pub struct HttpContentStore {
    http_client: ReqwestClient,
    base_url: String,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    fn cid_for(blob: &[u8]) -> String {
        let digest = Sha256::digest(blob);
        format!("sha256:{}", hex::encode(digest))
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn upload(&self, blob: &[u8]) -> anyhow::Result<String> {
        let cid = Self::cid_for(blob);
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), cid);
        let response = self
            .http_client
            .put(&url)
            .body(blob.to_vec())
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("content store upload failed with status {}", response.status());
        }
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cid_is_deterministic_for_same_content() {
        let a = HttpContentStore::cid_for(b"hello world");
        let b = HttpContentStore::cid_for(b"hello world");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }

    #[test]
    fn cid_differs_for_different_content() {
        let a = HttpContentStore::cid_for(b"hello");
        let b = HttpContentStore::cid_for(b"world");
        assert_ne!(a, b);
    }
}
