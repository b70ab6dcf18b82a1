//! Domain layer: task/result entities, repository and collaborator ports.
//!
//! Pure business logic with no infrastructure concerns — no sqlx, no axum,
//! no reqwest. Everything here is framework-agnostic.

pub mod device;
pub mod errors;
pub mod models;
pub mod ports;
pub mod reward;

pub use errors::{DomainError, DomainResult};
