use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::participant::{NewParticipant, Participant};
use crate::models::profile::Profile;
use crate::models::question::{Question, QuestionRow};
use crate::models::quiz::{Quiz, QuizRow};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::store::QuizStore;

#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let rows = sqlx::query_as::<_, QuizRow>(
            r#"SELECT id, title, description, difficulty, total_questions, created_at
               FROM quizzes"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Quiz::from).collect())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        let row = sqlx::query_as::<_, QuizRow>(
            r#"SELECT id, title, description, difficulty, total_questions, created_at
               FROM quizzes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Quiz::from))
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"SELECT id, quiz_id, question_text, option_a, option_b, option_c, option_d,
                      correct_answer, explanation, order_num
               FROM questions
               WHERE quiz_id = $1
               ORDER BY order_num ASC"#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Question::try_from).collect()
    }

    async fn insert_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt> {
        let row = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (user_id, quiz_id, score, total_questions, correct_answers)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, quiz_id, score, total_questions, correct_answers, completed_at
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.quiz_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.correct_answers)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            r#"SELECT id, username, display_name, total_points, current_streak, best_streak, level
               FROM profiles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, username, display_name, total_points, current_streak, best_streak, level)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, display_name, total_points, current_streak, best_streak, level
            "#,
        )
        .bind(profile.id)
        .bind(&profile.username)
        .bind(&profile.display_name)
        .bind(profile.total_points)
        .bind(profile.current_streak)
        .bind(profile.best_streak)
        .bind(&profile.level)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn award_profile(&self, id: Uuid, points: i32) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET total_points = total_points + $2,
                current_streak = current_streak + 1,
                best_streak = GREATEST(best_streak, current_streak + 1)
            WHERE id = $1
            RETURNING id, username, display_name, total_points, current_streak, best_streak, level
            "#,
        )
        .bind(id)
        .bind(points)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_participant(&self, participant: &NewParticipant) -> Result<Participant> {
        let row = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO form_users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(&participant.name)
        .bind(&participant.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_participant_by_email(&self, email: &str) -> Result<Option<Participant>> {
        let row = sqlx::query_as::<_, Participant>(
            r#"SELECT id, name, email, created_at FROM form_users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
