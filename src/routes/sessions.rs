use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::dto::session_dto::{AnswerRequest, SessionActionResponse, SessionView, StartSessionRequest};
use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/sessions",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session opened on the first question", body = SessionView),
        (status = 404, description = "Quiz not found or has no questions"),
        (status = 502, description = "Failed to load questions"),
    ),
)]
pub async fn start_session(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    payload: Option<Json<StartSessionRequest>>,
) -> Result<impl IntoResponse> {
    let request = payload.map(|Json(p)| p).unwrap_or_default();
    let options = request.options(state.session_service.settings().default_time_limit_secs);
    let view = state
        .session_service
        .start(quiz_id, request.participant_id, options)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/api/sessions/{token}",
    params(
        ("token" = String, Path, description = "Session token")
    ),
    responses(
        (status = 200, description = "Current session state", body = SessionView),
        (status = 404, description = "Session not found"),
    ),
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.session_service.snapshot(&token).await?))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{token}/answer",
    params(
        ("token" = String, Path, description = "Session token")
    ),
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer recorded, or ignored when `accepted` is false", body = SessionActionResponse),
        (status = 404, description = "Session not found"),
    ),
)]
pub async fn submit_answer(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse> {
    let reply = state
        .session_service
        .answer(&token, payload.label.trim())
        .await?;
    Ok(Json(reply))
}

#[utoipa::path(
    post,
    path = "/api/sessions/{token}/next",
    params(
        ("token" = String, Path, description = "Session token")
    ),
    responses(
        (status = 200, description = "Moved on, completed, or ignored when `accepted` is false", body = SessionActionResponse),
        (status = 404, description = "Session not found"),
    ),
)]
pub async fn next_question(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    Ok(Json(state.session_service.next(&token).await?))
}

#[utoipa::path(
    delete,
    path = "/api/sessions/{token}",
    params(
        ("token" = String, Path, description = "Session token")
    ),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Session not found"),
    ),
)]
pub async fn discard_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse> {
    state.session_service.discard(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Server-sent events for one session, starting with a `snapshot` event.
#[utoipa::path(
    get,
    path = "/api/sessions/{token}/events",
    params(
        ("token" = String, Path, description = "Session token")
    ),
    responses(
        (status = 200, description = "Event stream", body = String, content_type = "text/event-stream"),
        (status = 404, description = "Session not found"),
    ),
)]
pub async fn session_events(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let (receiver, view) = state.session_service.subscribe(&token).await?;
    tracing::info!(%token, "client subscribed to session events");

    let snapshot = Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&view)?);

    let updates = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(event.event_name())
                        .data(event.to_sse_data());
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let stream = stream::once(async move { Ok(snapshot) }).chain(updates);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
