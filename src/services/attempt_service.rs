use std::sync::Arc;

use crate::error::Result;
use crate::models::quiz_attempt::{NewQuizAttempt, QuizAttempt};
use crate::store::QuizStore;

#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn QuizStore>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn QuizStore>) -> Self {
        Self { store }
    }

    /// Writes the attempt, then credits the participant's profile.
    ///
    /// Only the attempt write can fail the call. A missing profile is skipped
    /// and a failed profile update is logged.
    pub async fn record_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt> {
        let saved = self.store.insert_attempt(attempt).await?;
        tracing::info!(
            attempt_id = %saved.id,
            quiz_id = %saved.quiz_id,
            score = saved.score,
            correct_answers = saved.correct_answers,
            "quiz attempt recorded"
        );

        if let Some(user_id) = attempt.user_id {
            if let Err(e) = self.award_profile(user_id, attempt.score).await {
                tracing::warn!(error = ?e, %user_id, "failed to update profile progress");
            }
        }

        Ok(saved)
    }

    async fn award_profile(&self, user_id: uuid::Uuid, points: i32) -> Result<()> {
        match self.store.award_profile(user_id, points).await? {
            Some(profile) => tracing::debug!(
                %user_id,
                total_points = profile.total_points,
                current_streak = profile.current_streak,
                "profile awarded"
            ),
            None => tracing::debug!(%user_id, "no profile to award"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::profile::Profile;
    use crate::store::{InMemoryQuizStore, MockQuizStore};
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn attempt(user_id: Option<Uuid>) -> NewQuizAttempt {
        NewQuizAttempt {
            user_id,
            quiz_id: Uuid::new_v4(),
            score: 20,
            total_questions: 3,
            correct_answers: 2,
        }
    }

    fn saved(a: &NewQuizAttempt) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4(),
            user_id: a.user_id,
            quiz_id: a.quiz_id,
            score: a.score,
            total_questions: a.total_questions,
            correct_answers: a.correct_answers,
            completed_at: Some(Utc::now()),
        }
    }

    #[tokio::test]
    async fn awards_points_after_insert() {
        let user_id = Uuid::new_v4();

        let mut store = MockQuizStore::new();
        store
            .expect_insert_attempt()
            .times(1)
            .returning(|a| Ok(saved(a)));
        store
            .expect_award_profile()
            .with(eq(user_id), eq(20))
            .times(1)
            .returning(|id, points| {
                let mut profile = Profile::new(id, "ana");
                profile.award(points);
                Ok(Some(profile))
            });

        let service = AttemptService::new(Arc::new(store));
        let row = service.record_attempt(&attempt(Some(user_id))).await.unwrap();
        assert_eq!(row.score, 20);
    }

    #[tokio::test]
    async fn missing_profile_is_skipped() {
        let mut store = MockQuizStore::new();
        store.expect_insert_attempt().returning(|a| Ok(saved(a)));
        store.expect_award_profile().times(1).returning(|_, _| Ok(None));

        let service = AttemptService::new(Arc::new(store));
        assert!(service
            .record_attempt(&attempt(Some(Uuid::new_v4())))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn insert_failure_is_returned() {
        let mut store = MockQuizStore::new();
        store
            .expect_insert_attempt()
            .returning(|_| Err(Error::Upstream("down".into())));
        store.expect_award_profile().never();

        let service = AttemptService::new(Arc::new(store));
        let err = service.record_attempt(&attempt(None)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_completions_both_count() {
        let store = InMemoryQuizStore::new();
        let user_id = Uuid::new_v4();
        store.insert_profile(&Profile::new(user_id, "ana")).await.unwrap();

        let service = AttemptService::new(Arc::new(store.clone()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let attempt = attempt(Some(user_id));
                tokio::spawn(async move { service.record_attempt(&attempt).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let first_attempt = attempt(Some(user_id));
        let second_attempt = attempt(Some(user_id));
        let (first, second) = tokio::join!(
            service.record_attempt(&first_attempt),
            service.record_attempt(&second_attempt),
        );
        first.unwrap();
        second.unwrap();

        let profile = store.get_profile(user_id).await.unwrap().unwrap();
        assert_eq!(store.attempts().len(), 10);
        assert_eq!(profile.total_points, 200);
        assert_eq!(profile.current_streak, 10);
        assert_eq!(profile.best_streak, 10);
    }
}
