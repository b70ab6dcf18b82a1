//! Maps [`DomainError`] onto the HTTP status taxonomy (spec.md §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

use crate::domain::errors::DomainError;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::TaskNotFound(_) => (StatusCode::NOT_FOUND, self.0.to_string()),
            DomainError::Conflict { .. } => (StatusCode::CONFLICT, self.0.to_string()),
            DomainError::InsufficientStake { .. } | DomainError::ValidationFailed(_) => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            DomainError::DatabaseError(_)
            | DomainError::SerializationError(_)
            | DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
            }
        };
        debug!(status = %status, error = %message, "request failed");
        (status, Json(json!({ "error": message }))).into_response()
    }
}
