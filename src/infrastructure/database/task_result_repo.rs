//! Sqlite-backed [`TaskResultRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ResourceUsage, TaskResult};
use crate::domain::ports::TaskResultRepository;

pub struct SqliteTaskResultRepository {
    pool: SqlitePool,
}

impl SqliteTaskResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_result(row: &sqlx::sqlite::SqliteRow) -> DomainResult<TaskResult> {
    let creator_address: String = row.try_get("creator_address")?;
    Ok(TaskResult {
        task_id: Uuid::parse_str(row.try_get::<String, _>("task_id")?.as_str())
            .map_err(|e| DomainError::SerializationError(e.to_string()))?,
        device_id: row.try_get("device_id")?,
        device_id_hash: row.try_get("device_id_hash")?,
        creator_address: Address::from_str(&creator_address)
            .map_err(|e| DomainError::SerializationError(e.to_string()))?,
        creator_device_id: row.try_get("creator_device_id")?,
        runner_address: row.try_get("runner_address")?,
        exit_code: row.try_get("exit_code")?,
        output: row.try_get("output")?,
        execution_time_ns: {
            let raw: i64 = row.try_get("execution_time_ns")?;
            raw as u64
        },
        resources: ResourceUsage {
            cpu_seconds: row.try_get("cpu_seconds")?,
            estimated_cycles: row.try_get("estimated_cycles")?,
            memory_gb_hours: row.try_get("memory_gb_hours")?,
            storage_gb: row.try_get("storage_gb")?,
            network_data_gb: row.try_get("network_data_gb")?,
        },
        logs_cid: row.try_get("logs_cid")?,
        reward: row.try_get("reward")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl TaskResultRepository for SqliteTaskResultRepository {
    async fn create(&self, result: &TaskResult) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO task_results
                (task_id, device_id, device_id_hash, creator_address, creator_device_id,
                 runner_address, exit_code, output, execution_time_ns,
                 cpu_seconds, estimated_cycles, memory_gb_hours, storage_gb, network_data_gb,
                 logs_cid, reward, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.task_id.to_string())
        .bind(&result.device_id)
        .bind(&result.device_id_hash)
        .bind(format!("{:#x}", result.creator_address))
        .bind(&result.creator_device_id)
        .bind(&result.runner_address)
        .bind(result.exit_code)
        .bind(&result.output)
        .bind(result.execution_time_ns as i64)
        .bind(result.resources.cpu_seconds)
        .bind(result.resources.estimated_cycles)
        .bind(result.resources.memory_gb_hours)
        .bind(result.resources.storage_gb)
        .bind(result.resources.network_data_gb)
        .bind(&result.logs_cid)
        .bind(result.reward)
        .bind(result.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, task_id: Uuid) -> DomainResult<Option<TaskResult>> {
        let row = sqlx::query("SELECT * FROM task_results WHERE task_id = ?")
            .bind(task_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_result).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::connection::DatabaseConnection;

    fn sample_result() -> TaskResult {
        TaskResult {
            task_id: Uuid::new_v4(),
            device_id: "a".repeat(64),
            device_id_hash: "deadbeef".to_string(),
            creator_address: Address::zero(),
            creator_device_id: "b".repeat(64),
            runner_address: "c".repeat(64),
            exit_code: 0,
            output: "ok".to_string(),
            execution_time_ns: 1_000,
            resources: ResourceUsage::default(),
            logs_cid: Some("bafy...".to_string()),
            reward: 2.5,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let conn = DatabaseConnection::new("sqlite::memory:", 5).await.unwrap();
        conn.migrate().await.unwrap();
        let repo = SqliteTaskResultRepository::new(conn.pool().clone());

        let result = sample_result();
        repo.create(&result).await.unwrap();
        let loaded = repo.get(result.task_id).await.unwrap().unwrap();
        assert_eq!(loaded.task_id, result.task_id);
        assert_eq!(loaded.reward, result.reward);
        assert_eq!(loaded.logs_cid, result.logs_cid);
    }

    #[tokio::test]
    async fn missing_task_returns_none() {
        let conn = DatabaseConnection::new("sqlite::memory:", 5).await.unwrap();
        conn.migrate().await.unwrap();
        let repo = SqliteTaskResultRepository::new(conn.pool().clone());
        assert!(repo.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
