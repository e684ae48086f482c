use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Write request for a finished session. `score` is in points, not answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuizAttempt {
    pub user_id: Option<Uuid>,
    pub quiz_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
}
