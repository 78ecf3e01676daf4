use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use futures::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{models::events::GameEvent, services::AppState};

/// SSE feed of a session's game events.
/// GET /api/v1/sessions/{id}/stream
pub async fn session_stream(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let handle = state
        .sessions
        .handle(&session_id)
        .await
        .ok_or((StatusCode::NOT_FOUND, "Session not found".to_string()))?;

    tracing::info!(%session_id, "Client connected to SSE stream");
    let stream = create_event_stream(handle.subscribe());
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Turn the session's broadcast channel into an SSE stream. Lagged receivers
/// skip the missed events and continue; the stream ends when the session loop
/// shuts down.
fn create_event_stream(
    receiver: broadcast::Receiver<GameEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(receiver, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(game_event) => {
                    let event = Event::default()
                        .event(game_event.event_name())
                        .data(game_event.to_sse_data());
                    return Some((Ok(event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "SSE subscriber lagged, skipping ahead");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Session event channel closed, ending SSE stream");
                    return None;
                }
            }
        }
    })
}
