//! Domain models: pure entities with business logic and validation rules.

pub mod config;
pub mod task;
pub mod task_result;

pub use config::{ChainConfig, Config, DatabaseConfig, DockerLimitsConfig, LoggingConfig, RunnerConfig, ServerConfig};
pub use task::{DockerConfig, DockerEnvironment, Task, TaskStatus, TaskType};
pub use task_result::{ResourceUsage, TaskResult, TaskResultSubmission};
