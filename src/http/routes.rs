//! HTTP surface wiring (spec.md §6), mounted under a configurable prefix.

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers::{runners, tasks};
use super::state::AppState;

/// Build the full API router, nested under `prefix` (e.g. `"/api"`).
pub fn build(prefix: &str, state: AppState) -> Router {
    let api = Router::new()
        .route("/tasks", post(tasks::create).get(tasks::list))
        .route("/tasks/:id", get(tasks::get))
        .route("/tasks/:id/assign", post(tasks::assign))
        .route("/tasks/:id/reward", get(tasks::reward))
        .route("/runners/webhooks", post(runners::register_webhook))
        .route(
            "/runners/webhooks/:id",
            delete(runners::unregister_webhook),
        )
        .route("/runners/heartbeat", post(runners::heartbeat))
        .route("/runners/tasks/available", get(runners::available_tasks))
        .route("/runners/tasks/:id/start", post(runners::start_task))
        .route("/runners/tasks/:id/complete", post(runners::complete_task))
        .route("/runners/tasks/:id/result", post(runners::submit_result).get(runners::get_result))
        .with_state(state);

    Router::new().nest(prefix, api)
}
