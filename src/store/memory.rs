use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::participant::{NewParticipant, Participant};
use crate::models::profile::Profile;
use crate::models::question::{OptionLabel, Question, QuestionOptions};
use crate::models::quiz::{Difficulty, Quiz};
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::store::QuizStore;

#[derive(Default)]
struct Tables {
    quizzes: Vec<Quiz>,
    questions: HashMap<Uuid, Vec<Question>>,
    attempts: Vec<QuizAttempt>,
    profiles: HashMap<Uuid, Profile>,
    participants: Vec<Participant>,
}

/// Process-local store for development runs and tests.
#[derive(Clone, Default)]
pub struct InMemoryQuizStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a small arithmetic catalogue.
    pub fn seeded() -> Self {
        let store = Self::new();
        let samples: [(&str, &str, Difficulty, &[(&str, [&str; 4], OptionLabel)]); 3] = [
            (
                "Addition Basics",
                "Warm up with single digit sums.",
                Difficulty::Easy,
                &[
                    ("What is 2 + 3?", ["4", "5", "6", "7"], OptionLabel::B),
                    ("What is 7 + 1?", ["8", "9", "6", "71"], OptionLabel::A),
                    ("What is 4 + 4?", ["6", "7", "9", "8"], OptionLabel::D),
                ],
            ),
            (
                "Times Tables",
                "Multiplication up to twelve.",
                Difficulty::Medium,
                &[
                    ("What is 7 x 8?", ["54", "56", "58", "64"], OptionLabel::B),
                    ("What is 9 x 6?", ["54", "45", "56", "63"], OptionLabel::A),
                    ("What is 12 x 11?", ["121", "122", "132", "144"], OptionLabel::C),
                ],
            ),
            (
                "Fractions",
                "Simplify and compare.",
                Difficulty::Hard,
                &[
                    ("Simplify 6/8.", ["2/3", "3/4", "4/6", "1/2"], OptionLabel::B),
                    ("Which is larger?", ["1/3", "2/7", "3/10", "2/5"], OptionLabel::D),
                ],
            ),
        ];

        for (title, description, difficulty, items) in samples {
            let quiz = Quiz {
                id: Uuid::new_v4(),
                title: title.to_string(),
                description: Some(description.to_string()),
                difficulty,
                total_questions: items.len() as i32,
            };
            let questions = items
                .iter()
                .enumerate()
                .map(|(i, (text, [a, b, c, d], correct))| Question {
                    id: Uuid::new_v4(),
                    quiz_id: quiz.id,
                    text: text.to_string(),
                    options: QuestionOptions {
                        a: a.to_string(),
                        b: b.to_string(),
                        c: c.to_string(),
                        d: d.to_string(),
                    },
                    correct_option: *correct,
                    explanation: Some(format!("The answer is {}.", correct)),
                    order_index: i as i32 + 1,
                })
                .collect();
            store.add_quiz(quiz, questions);
        }
        store
    }

    pub fn add_quiz(&self, quiz: Quiz, questions: Vec<Question>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.questions.insert(quiz.id, questions);
            tables.quizzes.push(quiz);
        }
    }

    pub fn attempts(&self) -> Vec<QuizAttempt> {
        self.tables
            .read()
            .map(|t| t.attempts.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        Ok(self.read()?.quizzes.clone())
    }

    async fn get_quiz(&self, id: Uuid) -> Result<Option<Quiz>> {
        Ok(self.read()?.quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn list_questions(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let mut questions = self
            .read()?
            .questions
            .get(&quiz_id)
            .cloned()
            .unwrap_or_default();
        questions.sort_by_key(|q| q.order_index);
        Ok(questions)
    }

    async fn insert_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt> {
        let row = QuizAttempt {
            id: Uuid::new_v4(),
            user_id: attempt.user_id,
            quiz_id: attempt.quiz_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            correct_answers: attempt.correct_answers,
            completed_at: Some(Utc::now()),
        };
        self.write()?.attempts.push(row.clone());
        Ok(row)
    }

    async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
        Ok(self.read()?.profiles.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
        let mut tables = self.write()?;
        if tables.profiles.contains_key(&profile.id) {
            return Err(Error::Conflict("Profile already exists".to_string()));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile.clone())
    }

    async fn award_profile(&self, id: Uuid, points: i32) -> Result<Option<Profile>> {
        let mut tables = self.write()?;
        Ok(tables.profiles.get_mut(&id).map(|profile| {
            profile.award(points);
            profile.clone()
        }))
    }

    async fn insert_participant(&self, participant: &NewParticipant) -> Result<Participant> {
        let mut tables = self.write()?;
        if tables
            .participants
            .iter()
            .any(|p| p.email.eq_ignore_ascii_case(&participant.email))
        {
            return Err(Error::Conflict("Email already registered".to_string()));
        }
        let row = Participant {
            id: Uuid::new_v4(),
            name: participant.name.clone(),
            email: participant.email.clone(),
            created_at: Some(Utc::now()),
        };
        tables.participants.push(row.clone());
        Ok(row)
    }

    async fn find_participant_by_email(&self, email: &str) -> Result<Option<Participant>> {
        Ok(self
            .read()?
            .participants
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_catalogue_has_ordered_questions() {
        let store = InMemoryQuizStore::seeded();
        let quizzes = store.list_quizzes().await.unwrap();
        assert_eq!(quizzes.len(), 3);

        for quiz in quizzes {
            let questions = store.list_questions(quiz.id).await.unwrap();
            assert_eq!(questions.len() as i32, quiz.total_questions);
            assert!(questions.windows(2).all(|w| w[0].order_index < w[1].order_index));
        }
    }

    #[tokio::test]
    async fn duplicate_participant_email_conflicts() {
        let store = InMemoryQuizStore::new();
        let new = NewParticipant {
            name: "Ana".into(),
            email: "ana@example.com".into(),
        };
        store.insert_participant(&new).await.unwrap();
        let err = store.insert_participant(&new).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(store
            .find_participant_by_email("ANA@example.com")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn unknown_quiz_has_no_questions() {
        let store = InMemoryQuizStore::seeded();
        assert!(store.get_quiz(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.list_questions(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn award_updates_profile_in_place() {
        let store = InMemoryQuizStore::new();
        let id = Uuid::new_v4();
        store.insert_profile(&Profile::new(id, "ana")).await.unwrap();

        store.award_profile(id, 10).await.unwrap();
        let profile = store.award_profile(id, 30).await.unwrap().unwrap();
        assert_eq!(profile.total_points, 40);
        assert_eq!(profile.current_streak, 2);
        assert_eq!(profile.best_streak, 2);

        assert!(store.award_profile(Uuid::new_v4(), 10).await.unwrap().is_none());
    }
}
