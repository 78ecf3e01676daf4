use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    models::leaderboard::{SubmitScoreRequest, SubmitScoreResponse},
    services::AppState,
};

pub async fn get_leaderboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = state.leaderboard.list().await;
    (StatusCode::OK, Json(entries))
}

pub async fn submit_score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitScoreRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    req.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Validation error: {}", e) })),
        )
    })?;

    let rank = state.leaderboard.submit(req).await;
    Ok((
        StatusCode::OK,
        Json(SubmitScoreResponse {
            success: true,
            rank,
        }),
    ))
}
