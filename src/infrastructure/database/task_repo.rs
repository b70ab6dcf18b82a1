//! Sqlite-backed [`TaskRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::Address;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskStatus, TaskType};
use crate::domain::ports::TaskRepository;

pub struct SqliteTaskRepository {
    pool: SqlitePool,
}

impl SqliteTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn status_str(status: TaskStatus) -> &'static str {
    status.as_str()
}

fn parse_status(s: &str) -> TaskStatus {
    match s {
        "pending" => TaskStatus::Pending,
        "running" => TaskStatus::Running,
        "completed" => TaskStatus::Completed,
        "failed" => TaskStatus::Failed,
        other => panic!("unknown task status persisted: {other}"),
    }
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> DomainResult<Task> {
    let task_type: String = row.try_get("task_type")?;
    let creator_address: String = row.try_get("creator_address")?;
    Ok(Task {
        id: Uuid::parse_str(row.try_get::<String, _>("id")?.as_str())
            .map_err(|e| crate::domain::errors::DomainError::SerializationError(e.to_string()))?,
        creator_id: Uuid::parse_str(row.try_get::<String, _>("creator_id")?.as_str())
            .map_err(|e| crate::domain::errors::DomainError::SerializationError(e.to_string()))?,
        creator_device_id: row.try_get("creator_device_id")?,
        creator_address: Address::from_str(&creator_address)
            .map_err(|e| crate::domain::errors::DomainError::SerializationError(e.to_string()))?,
        task_type: TaskType::from_str(&task_type).ok_or_else(|| {
            crate::domain::errors::DomainError::SerializationError(format!(
                "unknown task_type persisted: {task_type}"
            ))
        })?,
        config: serde_json::from_str(row.try_get::<String, _>("config")?.as_str())?,
        environment: serde_json::from_str(row.try_get::<String, _>("environment")?.as_str())?,
        reward: row.try_get("reward")?,
        status: parse_status(row.try_get::<String, _>("status")?.as_str()),
        runner_id: row.try_get("runner_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        completed_at: row.try_get::<Option<DateTime<Utc>>, _>("completed_at")?,
        version: row.try_get::<i64, _>("version")? as u64,
    })
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn create(&self, task: &Task) -> DomainResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, creator_id, creator_device_id, creator_address, task_type,
                 config, environment, reward, status, runner_id, created_at, updated_at, completed_at, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.to_string())
        .bind(task.creator_id.to_string())
        .bind(&task.creator_device_id)
        .bind(format!("{:#x}", task.creator_address))
        .bind(task.task_type.as_str())
        .bind(serde_json::to_string(&task.config)?)
        .bind(serde_json::to_string(&task.environment)?)
        .bind(task.reward)
        .bind(status_str(task.status))
        .bind(&task.runner_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .bind(task.completed_at)
        .bind(task.version as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_task).transpose()
    }

    async fn assign(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, runner_id = ?, updated_at = ?, version = version + 1
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(status_str(TaskStatus::Running))
        .bind(runner_id)
        .bind(now)
        .bind(id.to_string())
        .bind(status_str(TaskStatus::Pending))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn complete(&self, id: Uuid, runner_id: &str) -> DomainResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, updated_at = ?, completed_at = ?, version = version + 1
            WHERE id = ? AND status = ? AND runner_id = ?
            "#,
        )
        .bind(status_str(TaskStatus::Completed))
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .bind(status_str(TaskStatus::Running))
        .bind(runner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn fail(&self, id: Uuid) -> DomainResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, updated_at = ?, completed_at = ?, version = version + 1
            WHERE id = ? AND status NOT IN (?, ?)
            "#,
        )
        .bind(status_str(TaskStatus::Failed))
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .bind(status_str(TaskStatus::Completed))
        .bind(status_str(TaskStatus::Failed))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn reclaim(&self, id: Uuid) -> DomainResult<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = ?, runner_id = NULL, updated_at = ?, version = version + 1
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(status_str(TaskStatus::Pending))
        .bind(now)
        .bind(id.to_string())
        .bind(status_str(TaskStatus::Running))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_by_status(&self, status: TaskStatus) -> DomainResult<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks WHERE status = ? ORDER BY created_at ASC")
            .bind(status_str(status))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_task).collect()
    }

    async fn list_all(&self) -> DomainResult<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_task).collect()
    }
}
