//! Bible element routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;
use storyloom_store::{DeleteOutcome, NewBibleElement, ParentRef};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stories/{id}/bible", get(list_elements))
        .route("/bible", post(create_element))
        .route("/bible/{id}", put(update_element).delete(delete_element))
        .route("/bible/{id}/history", get(element_history))
}

async fn list_elements(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<i64>,
) -> impl IntoResponse {
    match state.store.list_bible_elements(story_id) {
        Ok(elements) => (StatusCode::OK, Json(serde_json::json!(elements))),
        Err(e) => error_response(e),
    }
}

async fn create_element(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewBibleElement>,
) -> impl IntoResponse {
    match state.store.create_bible_element(req) {
        Ok(element) => (StatusCode::OK, Json(serde_json::json!(element))),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct UpdateElementRequest {
    name: String,
    content: String,
}

async fn update_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateElementRequest>,
) -> impl IntoResponse {
    match state.store.update_bible_element(id, &req.name, &req.content) {
        Ok(element) => (StatusCode::OK, Json(serde_json::json!(element))),
        Err(e) => error_response(e),
    }
}

async fn delete_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_bible_element(id) {
        Ok(DeleteOutcome::Deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Element deleted" })),
        ),
        Ok(DeleteOutcome::Protected) => (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": "story_settings elements cannot be deleted"
            })),
        ),
        Err(e) => error_response(e),
    }
}

async fn element_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.list_history(ParentRef::BibleElement(id)) {
        Ok(history) => (StatusCode::OK, Json(serde_json::json!(history))),
        Err(e) => error_response(e),
    }
}
