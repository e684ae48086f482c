use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::quiz_dto::QuizSummary;
use crate::error::Result;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses(
        (status = 200, description = "Quiz catalogue", body = [QuizSummary]),
        (status = 502, description = "Data backend unavailable"),
    ),
)]
pub async fn list_quizzes(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let quizzes: Vec<QuizSummary> = state
        .quiz_service
        .list_quizzes()
        .await?
        .into_iter()
        .map(QuizSummary::from)
        .collect();
    Ok(Json(quizzes))
}

#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(
        ("id" = Uuid, Path, description = "Quiz ID")
    ),
    responses(
        (status = 200, description = "Quiz found", body = QuizSummary),
        (status = 404, description = "Quiz not found"),
    ),
)]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let quiz = state.quiz_service.get_quiz(id).await?;
    Ok(Json(QuizSummary::from(quiz)))
}
