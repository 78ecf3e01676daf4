use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::services::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "cinemaiq-api",
            "version": env!("CARGO_PKG_VERSION"),
            "questions": state.catalog.questions.len(),
            "categories": state.catalog.categories.len(),
        })),
    )
}

pub mod catalog;
pub mod leaderboard;
pub mod sessions;
pub mod sse;
