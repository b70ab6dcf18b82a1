//! Domain errors for the task coordination and execution plane.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors raised while enforcing task lifecycle and
/// reward-admission rules.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    /// Illegal state transition attempted on a task (e.g. assigning a task
    /// that is no longer pending). Maps to HTTP 409 at the API boundary.
    #[error("task {id} is {status}, expected {expected}")]
    Conflict {
        id: Uuid,
        status: String,
        expected: String,
    },

    /// Creator's on-chain staked balance does not cover the task reward.
    #[error("insufficient stake: have {have}, need {need}")]
    InsufficientStake { have: String, need: String },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Catch-all for collaborator failures (chain RPC, container runtime)
    /// that are surfaced as 500s rather than rejected client input.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
