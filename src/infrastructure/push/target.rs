//! The Registered Push Target record (spec.md §3), held only in process
//! memory by the Push Fan-Out component.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PushTarget {
    pub id: Uuid,
    pub url: String,
    pub runner_id: String,
    pub device_id: String,
    pub created_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
}

impl PushTarget {
    pub fn new(url: impl Into<String>, runner_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            runner_id: runner_id.into(),
            device_id: device_id.into(),
            created_at: now,
            last_heartbeat_at: now,
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_heartbeat_at) > threshold
    }
}
