//! Persistence seam. The service never talks to a backend directly; every
//! read and write goes through a [`QuizStore`] chosen in `main`.

pub mod memory;
pub mod postgres;
pub mod rest;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::participant::{NewParticipant, Participant};
use crate::models::profile::Profile;
use crate::models::question::Question;
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};

pub use memory::InMemoryQuizStore;
pub use postgres::PgQuizStore;
pub use rest::RestQuizStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>>;

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>>;

    /// Questions of one quiz, ascending by `order_index`.
    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>>;

    async fn insert_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt>;

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile>;

    /// Adds `points`, extends the streak and raises the best streak, as one
    /// atomic step. `None` when the profile does not exist.
    async fn award_profile(&self, id: Uuid, points: i32) -> Result<Option<Profile>>;

    /// Fails with `Error::Conflict` when the email is already registered.
    async fn insert_participant(&self, participant: &NewParticipant) -> Result<Participant>;

    async fn find_participant_by_email(&self, email: &str) -> Result<Option<Participant>>;
}
