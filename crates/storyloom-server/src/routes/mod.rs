//! HTTP route handlers.

pub mod ai;
pub mod bible;
pub mod chapters;
pub mod settings;
pub mod stories;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::state::AppState;
use storyloom_core::Error;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(stories::routes())
        .merge(bible::routes())
        .merge(chapters::routes())
        .merge(settings::routes())
        .merge(ai::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a store or gateway error onto the HTTP boundary.
pub(crate) fn error_response(e: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &e {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Upstream { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": e.to_string() })))
}
