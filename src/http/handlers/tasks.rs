//! `/tasks` endpoints (spec.md §6).

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use ethers::types::Address;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{Task, TaskType};

use super::super::error::ApiError;
use super::super::extract::device_id_header;
use super::super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub task_type: TaskType,
    pub config: Value,
    pub environment: Value,
    pub reward: f64,
    pub creator_address: Address,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub runner_id: String,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let creator_device_id = device_id_header(&headers, "X-Device-ID")?;

    let now = chrono::Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        creator_id: Uuid::new_v4(),
        creator_device_id,
        creator_address: body.creator_address,
        task_type: body.task_type,
        config: body.config,
        environment: body.environment,
        reward: body.reward,
        status: crate::domain::models::TaskStatus::Pending,
        runner_id: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
        version: 0,
    };

    let created = state.task_service.create(task).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let tasks = state.task_service.list_all().await?;
    Ok(Json(tasks))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state
        .task_service
        .get(id)
        .await?
        .ok_or(DomainError::TaskNotFound(id))?;
    Ok(Json(task))
}

pub async fn assign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.task_service.assign(id, &body.runner_id).await?;
    Ok(StatusCode::OK)
}

pub async fn reward(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reward = state.task_service.reward_for(id).await?;
    Ok(Json(reward))
}
