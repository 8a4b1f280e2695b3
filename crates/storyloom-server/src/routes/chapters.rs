//! Chapter routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;

use super::error_response;
use crate::state::AppState;
use storyloom_store::{NewChapter, ParentRef};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stories/{id}/chapters", get(list_chapters))
        .route("/chapters", post(create_chapter))
        .route("/chapters/{id}", put(update_chapter).delete(delete_chapter))
        .route("/chapters/{id}/history", get(chapter_history))
}

async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(story_id): Path<i64>,
) -> impl IntoResponse {
    match state.store.list_chapters(story_id) {
        Ok(chapters) => (StatusCode::OK, Json(serde_json::json!(chapters))),
        Err(e) => error_response(e),
    }
}

async fn create_chapter(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewChapter>,
) -> impl IntoResponse {
    match state.store.create_chapter(req) {
        Ok(chapter) => (StatusCode::OK, Json(serde_json::json!(chapter))),
        Err(e) => error_response(e),
    }
}

#[derive(Deserialize)]
struct UpdateChapterRequest {
    title: String,
    content: String,
}

async fn update_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateChapterRequest>,
) -> impl IntoResponse {
    match state.store.update_chapter(id, &req.title, &req.content) {
        Ok(chapter) => (StatusCode::OK, Json(serde_json::json!(chapter))),
        Err(e) => error_response(e),
    }
}

async fn delete_chapter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.delete_chapter(id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Chapter deleted" })),
        ),
        Err(e) => error_response(e),
    }
}

async fn chapter_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.store.list_history(ParentRef::Chapter(id)) {
        Ok(history) => (StatusCode::OK, Json(serde_json::json!(history))),
        Err(e) => error_response(e),
    }
}
