//! End-to-end HTTP coverage of the task lifecycle (admission through
//! settlement) and its rejection paths.

mod support;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use ethers::types::U256;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn device_id() -> String {
    "a".repeat(64)
}

fn runner_id() -> String {
    "b".repeat(64)
}

fn create_body(reward: f64) -> Value {
    json!({
        "task_type": "docker",
        "config": { "command": ["echo", "ok"] },
        "environment": { "image": "alpine:3", "workdir": "/w", "env": [] },
        "reward": reward,
        "creator_address": format!("0x{:040x}", 1),
    })
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn happy_path_from_creation_through_reward_dispatch() {
    let dispatcher = std::sync::Arc::new(support::RecordingDispatcher::default());
    let app = support::build_app(U256::from(10).pow(U256::from(18)), dispatcher.clone());

    let create_req = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .header("X-Device-ID", device_id())
        .body(Body::from(create_body(1.0).to_string()))
        .unwrap();
    let response = app.clone().oneshot(create_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let task_id = created["id"].as_str().unwrap();

    let assign_req = Request::builder()
        .method("POST")
        .uri(format!("/api/tasks/{task_id}/assign"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "runner_id": runner_id() }).to_string()))
        .unwrap();
    let response = app.clone().oneshot(assign_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let start_req = Request::builder()
        .method("POST")
        .uri(format!("/api/runners/tasks/{task_id}/start"))
        .header("X-Runner-ID", runner_id())
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(start_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let submit_req = Request::builder()
        .method("POST")
        .uri(format!("/api/runners/tasks/{task_id}/result"))
        .header("content-type", "application/json")
        .header("X-Device-ID", runner_id())
        .body(Body::from(
            json!({
                "task_id": Uuid::nil(),
                "exit_code": 0,
                "output": "ok",
                "execution_time_ns": 1000,
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(submit_req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result = json_body(response).await;
    assert_eq!(result["exit_code"], 0);

    let get_req = Request::builder()
        .method("GET")
        .uri(format!("/api/tasks/{task_id}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(get_req).await.unwrap();
    let task = json_body(response).await;
    assert_eq!(task["status"], "completed");

    assert_eq!(dispatcher.dispatched.lock().await.len(), 1);
}

#[tokio::test]
async fn creation_rejected_when_stake_is_below_reward() {
    let app = support::build_app(U256::zero(), support::null_dispatcher());

    let req = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .header("X-Device-ID", device_id())
        .body(Body::from(create_body(5.0).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn creation_rejected_without_device_id_header() {
    let app = support::build_app(U256::from(10).pow(U256::from(18)), support::null_dispatcher());

    let req = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(Body::from(create_body(1.0).to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn second_assignment_attempt_conflicts() {
    let app = support::build_app(U256::from(10).pow(U256::from(18)), support::null_dispatcher());

    let create_req = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .header("X-Device-ID", device_id())
        .body(Body::from(create_body(1.0).to_string()))
        .unwrap();
    let response = app.clone().oneshot(create_req).await.unwrap();
    let created = json_body(response).await;
    let task_id = created["id"].as_str().unwrap();

    let assign = |runner: &str| {
        Request::builder()
            .method("POST")
            .uri(format!("/api/tasks/{task_id}/assign"))
            .header("content-type", "application/json")
            .body(Body::from(json!({ "runner_id": runner }).to_string()))
            .unwrap()
    };

    let first = app.clone().oneshot(assign(&runner_id())).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(assign("c".repeat(64).as_str())).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn fetching_unknown_task_is_not_found() {
    let app = support::build_app(U256::from(10).pow(U256::from(18)), support::null_dispatcher());

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/tasks/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
