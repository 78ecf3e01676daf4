use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    models::{
        ChangeFilterRequest, CreateSessionRequest, CreateSessionResponse, SubmitAnswerRequest,
        VisibilityRequest,
    },
    services::{session_service::EngineError, AppState},
};

fn engine_error_response(e: EngineError) -> (StatusCode, String) {
    let status = match &e {
        EngineError::NotFound | EngineError::Closed => StatusCode::NOT_FOUND,
        EngineError::UnknownFilter(_) => StatusCode::BAD_REQUEST,
    };
    (status, e.to_string())
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(filter = ?req.filter, "Creating session");

    match state.sessions.create(req.filter).await {
        Ok((session_id, snapshot)) => Ok((
            StatusCode::CREATED,
            Json(CreateSessionResponse {
                session_id,
                snapshot,
            }),
        )),
        Err(e) => {
            tracing::warn!("Failed to create session: {}", e);
            Err(engine_error_response(e))
        }
    }
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or_else(|| engine_error_response(EngineError::NotFound))?;

    let snapshot = handle.snapshot().await.map_err(engine_error_response)?;
    Ok((StatusCode::OK, Json(snapshot)))
}

pub async fn update_visibility(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<VisibilityRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or_else(|| engine_error_response(EngineError::NotFound))?;

    handle
        .set_visibility(req.card, req.visible)
        .map_err(engine_error_response)?;
    Ok((StatusCode::NO_CONTENT, ()))
}

pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(%session_id, card = req.card, "Submitting answer");

    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or_else(|| engine_error_response(EngineError::NotFound))?;

    let response = handle
        .answer(req.card, req.option)
        .await
        .map_err(engine_error_response)?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn change_filter(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<ChangeFilterRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!(%session_id, filter = %req.filter, "Changing filter");

    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or_else(|| engine_error_response(EngineError::NotFound))?;

    let snapshot = handle
        .change_filter(req.filter)
        .await
        .map_err(engine_error_response)?;
    Ok((StatusCode::OK, Json(snapshot)))
}

pub async fn load_more(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or_else(|| engine_error_response(EngineError::NotFound))?;

    let snapshot = handle.load_more().await.map_err(engine_error_response)?;
    Ok((StatusCode::OK, Json(snapshot)))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if state.sessions.remove(&session_id).await {
        Ok((StatusCode::NO_CONTENT, ()))
    } else {
        Err(engine_error_response(EngineError::NotFound))
    }
}
