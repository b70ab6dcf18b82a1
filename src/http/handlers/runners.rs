//! `/runners/*` endpoints (spec.md §6).

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::TaskResultSubmission;
use crate::services::result_handler::{self, RunnerIdentity};

use super::super::error::ApiError;
use super::super::extract::device_id_header;
use super::super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterWebhookRequest {
    pub url: String,
    pub runner_id: String,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterWebhookResponse {
    pub id: Uuid,
}

pub async fn register_webhook(
    State(state): State<AppState>,
    Json(body): Json<RegisterWebhookRequest>,
) -> impl IntoResponse {
    let id = state
        .fanout
        .register(body.url, body.runner_id, body.device_id)
        .await;
    (StatusCode::CREATED, Json(RegisterWebhookResponse { id }))
}

pub async fn unregister_webhook(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if state.fanout.unregister(id).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub webhook_id: Uuid,
}

pub async fn heartbeat(
    State(state): State<AppState>,
    Json(body): Json<HeartbeatRequest>,
) -> impl IntoResponse {
    if state.fanout.heartbeat(body.webhook_id).await {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

pub async fn available_tasks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.task_service.list_available().await?;
    Ok(Json(tasks))
}

pub async fn start_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let runner_id = device_id_header(&headers, "X-Runner-ID")?;

    let task = state
        .task_service
        .get(id)
        .await?
        .ok_or(DomainError::TaskNotFound(id))?;
    if task.runner_id.as_deref() != Some(runner_id.as_str()) {
        return Err(DomainError::Conflict {
            id,
            status: "not-assigned-runner".to_string(),
            expected: task.runner_id.unwrap_or_default(),
        }
        .into());
    }

    state.task_service.start(id).await?;
    Ok(StatusCode::OK)
}

pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let runner_id = device_id_header(&headers, "X-Runner-ID")?;
    state.task_service.complete(id, &runner_id).await?;
    Ok(StatusCode::OK)
}

pub async fn submit_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(mut body): Json<TaskResultSubmission>,
) -> Result<impl IntoResponse, ApiError> {
    let device_id = device_id_header(&headers, "X-Device-ID")?;
    body.task_id = id;

    let identity = RunnerIdentity { device_id };
    let result = result_handler::handle_submission(
        &state.task_repo,
        &state.task_service,
        &state.reward_dispatcher,
        identity,
        body,
    )
    .await?;
    Ok(Json(result))
}

pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .task_service
        .get_result(id)
        .await?
        .ok_or(DomainError::TaskNotFound(id))?;
    Ok(Json(result))
}
