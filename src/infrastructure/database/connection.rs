//! SQLite connection pool: WAL mode, bounded pool size, embedded migrations.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};

/// Owns the sqlite pool and the one-time migration step.
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: SqlitePool,
}

impl DatabaseConnection {
    /// Open (creating if absent) the database at `database_url` with WAL
    /// mode and a bounded connection pool.
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run embedded migrations. Idempotent — safe to call on every startup.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Revert the most recently applied migration using its paired
    /// `.down.sql` script (the `migrate --down` CLI path).
    ///
    /// `undo`'s `target` is the version to land on, not a count. With a
    /// single `0001_init` migration, reverting "the most recent one" means
    /// targeting version 0 (the state before any migration ran).
    pub async fn migrate_down(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").undo(&self.pool, 0).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
