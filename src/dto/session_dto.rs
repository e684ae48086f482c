use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::question::{OptionLabel, Question};
use crate::services::quiz_session::{
    AttemptSummary, Celebration, QuizSession, SessionOptions, SessionState, TimerPolicy,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Registered participant; without one the attempt is not saved.
    pub participant_id: Option<Uuid>,
    /// Seconds per question, 0 for no countdown.
    pub time_limit_seconds: Option<u32>,
    pub reveal_explanations: Option<bool>,
    pub celebrations: Option<bool>,
}

impl StartSessionRequest {
    pub fn options(&self, default_time_limit: u32) -> SessionOptions {
        let defaults = SessionOptions::default();
        SessionOptions {
            timer: TimerPolicy::from_seconds(self.time_limit_seconds.unwrap_or(default_time_limit)),
            reveal_explanations: self.reveal_explanations.unwrap_or(defaults.reveal_explanations),
            celebrations: self.celebrations.unwrap_or(defaults.celebrations),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// One of `A`, `B`, `C`, `D`. Anything else is scored as wrong.
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionView {
    pub label: OptionLabel,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<OptionView>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|(label, text)| OptionView {
                    label,
                    text: text.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResultView {
    pub correct_answers: u32,
    pub question_count: usize,
    pub total_questions: i32,
    pub points: u32,
    pub perfect: bool,
    pub celebration: Option<Celebration>,
}

impl From<AttemptSummary> for ResultView {
    fn from(summary: AttemptSummary) -> Self {
        Self {
            correct_answers: summary.correct_answers,
            question_count: summary.question_count,
            total_questions: summary.total_questions,
            points: summary.points,
            perfect: summary.perfect,
            celebration: summary.celebration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub token: String,
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub state: SessionState,
    pub current_index: usize,
    pub question_count: usize,
    pub question: Option<QuestionView>,
    pub selected_answer: Option<String>,
    pub is_correct: Option<bool>,
    /// Revealed once the current question has been answered.
    pub correct_option: Option<OptionLabel>,
    pub explanation: Option<String>,
    pub score: u32,
    /// Absent for untimed sessions.
    pub time_remaining: Option<u32>,
    pub time_limit_seconds: Option<u32>,
    pub is_last_question: bool,
    pub result: Option<ResultView>,
}

impl SessionView {
    pub fn from_session(token: &str, session: &QuizSession) -> Self {
        let question = session.current_question();
        let answered = session.selected_answer().is_some();
        let revealed = question.filter(|_| answered);

        Self {
            token: token.to_string(),
            quiz_id: session.quiz().id,
            quiz_title: session.quiz().title.clone(),
            state: session.state(),
            current_index: session.current_index(),
            question_count: session.question_count(),
            question: question.map(QuestionView::from),
            selected_answer: session.selected_answer().map(str::to_string),
            is_correct: session.answer_log().get(&session.current_index()).copied(),
            correct_option: revealed.map(|q| q.correct_option),
            explanation: revealed
                .filter(|_| session.options().reveal_explanations)
                .and_then(|q| q.explanation.clone()),
            score: session.score(),
            time_remaining: session.time_remaining(),
            time_limit_seconds: session.options().timer.seconds(),
            is_last_question: session.is_last_question(),
            result: session.summary().map(ResultView::from),
        }
    }
}

/// Reply to answer and next requests. `accepted` is false when the request
/// was a no-op in the current state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionActionResponse {
    pub accepted: bool,
    pub notification: Option<String>,
    pub session: SessionView,
}
