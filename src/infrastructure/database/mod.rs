//! Database infrastructure
//!
//! SQLite persistence via sqlx:
//! - WAL-mode connection pool and embedded migrations
//! - Repository adapters for the Task and TaskResult ports

pub mod connection;
pub mod task_repo;
pub mod task_result_repo;

pub use connection::DatabaseConnection;
pub use task_repo::SqliteTaskRepository;
pub use task_result_repo::SqliteTaskResultRepository;
