use axum::Json;
use utoipa::OpenApi;

use crate::dto::participant_dto::{ParticipantResponse, ProfileResponse, RegisterParticipantRequest};
use crate::dto::quiz_dto::QuizSummary;
use crate::dto::session_dto::{
    AnswerRequest, OptionView, QuestionView, ResultView, SessionActionResponse, SessionView,
    StartSessionRequest,
};
use crate::models::question::OptionLabel;
use crate::routes::{participants, quizzes, sessions};
use crate::services::quiz_session::{Celebration, SessionState};

#[derive(OpenApi)]
#[openapi(
    paths(
        quizzes::list_quizzes,
        quizzes::get_quiz,
        sessions::start_session,
        sessions::get_session,
        sessions::submit_answer,
        sessions::next_question,
        sessions::discard_session,
        sessions::session_events,
        participants::register_participant,
        participants::get_profile,
    ),
    components(schemas(
        QuizSummary,
        StartSessionRequest,
        AnswerRequest,
        SessionView,
        SessionActionResponse,
        QuestionView,
        OptionView,
        ResultView,
        OptionLabel,
        SessionState,
        Celebration,
        RegisterParticipantRequest,
        ParticipantResponse,
        ProfileResponse,
    )),
    tags((name = "quiz-backend", description = "Quiz sessions, catalogue and participants"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
