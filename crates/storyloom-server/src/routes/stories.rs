//! Story routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stories", get(list_stories).post(create_story))
        .route("/stories/{id}", delete(delete_story))
}

async fn list_stories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_stories() {
        Ok(stories) => (StatusCode::OK, Json(serde_json::json!(stories))),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct CreateStoryRequest {
    title: String,
    description: Option<String>,
}

/// Creating a story also creates its `story_settings` bible element,
/// seeded from the current schema, in the same transaction.
async fn create_story(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateStoryRequest>,
) -> impl IntoResponse {
    match state
        .store
        .create_story(&req.title, req.description.as_deref())
    {
        Ok(story) => (StatusCode::OK, Json(serde_json::json!(story))),
        Err(e) => error_response(e),
    }
}

async fn delete_story(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_story(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Story deleted" })),
        ),
        Err(e) => error_response(e),
    }
}
