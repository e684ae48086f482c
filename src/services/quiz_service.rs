use std::sync::Arc;

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::quiz::Quiz;
use crate::store::QuizStore;

#[derive(Clone)]
pub struct QuizService {
    store: Arc<dyn QuizStore>,
}

impl QuizService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Catalogue ordered easy, medium, hard, then anything else; ties by title.
    pub async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let mut quizzes = self.store.list_quizzes().await?;
        quizzes.sort_by(|a, b| {
            a.difficulty
                .rank()
                .cmp(&b.difficulty.rank())
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(quizzes)
    }

    pub async fn get_quiz(&self, id: Uuid) -> Result<Quiz> {
        self.store
            .get_quiz(id)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))
    }
}
