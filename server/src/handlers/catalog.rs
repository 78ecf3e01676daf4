use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::services::AppState;

/// Category list for the filter bar, in catalog order.
pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.catalog.categories.clone()))
}
