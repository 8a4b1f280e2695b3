//! Settings routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/settings", get(list_settings))
        .route("/settings/{key}", get(get_setting).post(set_setting))
}

async fn list_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store.list_settings() {
        Ok(all) => {
            let object: serde_json::Map<String, serde_json::Value> = all.into_iter().collect();
            (StatusCode::OK, Json(serde_json::Value::Object(object)))
        }
        Err(e) => error_response(e),
    }
}

async fn get_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.store.get_setting(&key) {
        Ok(Some(value)) => (StatusCode::OK, Json(value)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Setting not found" })),
        ),
        Err(e) => error_response(e),
    }
}

async fn set_setting(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> impl IntoResponse {
    match state.store.set_setting(&key, &value) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Setting updated" })),
        ),
        Err(e) => error_response(e),
    }
}
