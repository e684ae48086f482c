use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};
use uuid::Uuid;

use crate::dto::session_dto::{SessionActionResponse, SessionView};
use crate::error::{Error, Result};
use crate::models::session_event::{notification_for, SessionEvent};
use crate::services::attempt_service::AttemptService;
use crate::services::countdown::Countdown;
use crate::services::quiz_session::{
    Advance, AdvanceTrigger, AttemptSummary, QuizSession, SessionOptions, SessionState, Tick,
    DEFAULT_QUESTION_TIME_LIMIT_SECS,
};
use crate::store::QuizStore;
use crate::utils::token::generate_session_token;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    /// Used when a start request does not pick its own limit.
    pub default_time_limit_secs: u32,
    pub tick_interval: Duration,
    pub idle_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_time_limit_secs: DEFAULT_QUESTION_TIME_LIMIT_SECS,
            tick_interval: Duration::from_secs(1),
            idle_ttl: Duration::from_secs(120 * 60),
        }
    }
}

struct SessionCell {
    session: QuizSession,
    countdown: Option<Countdown>,
}

impl SessionCell {
    fn stop_countdown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            trace!(
                owner = countdown.owner(),
                expired = countdown.is_finished(),
                "countdown released"
            );
            countdown.cancel();
        }
    }
}

pub struct SessionHandle {
    token: String,
    participant_id: Option<Uuid>,
    cell: Mutex<SessionCell>,
    events: broadcast::Sender<SessionEvent>,
    last_activity: StdMutex<Instant>,
}

impl SessionHandle {
    fn touch(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self, now: Instant) -> Duration {
        self.last_activity
            .lock()
            .map(|last| now.saturating_duration_since(*last))
            .unwrap_or_default()
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Registry of live quiz sessions.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn QuizStore>,
    attempts: AttemptService,
    settings: SessionSettings,
    sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
}

impl SessionService {
    pub fn new(store: Arc<dyn QuizStore>, attempts: AttemptService, settings: SessionSettings) -> Self {
        Self {
            store,
            attempts,
            settings,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Loads the quiz and its questions and opens a session on the first question.
    /// Nothing is registered when loading fails.
    pub async fn start(
        &self,
        quiz_id: Uuid,
        participant_id: Option<Uuid>,
        options: SessionOptions,
    ) -> Result<SessionView> {
        let quiz = self
            .store
            .get_quiz(quiz_id)
            .await?
            .ok_or_else(|| Error::NotFound("Quiz not found".to_string()))?;

        let questions = self.store.list_questions(quiz_id).await.map_err(|e| match e {
            Error::Internal(_) => e,
            other => {
                error!(error = ?other, %quiz_id, "failed to load questions");
                Error::Upstream("Failed to load questions".to_string())
            }
        })?;

        let mut session = QuizSession::new(quiz, options);
        session.begin(questions)?;

        let token = generate_session_token();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let handle = Arc::new(SessionHandle {
            token: token.clone(),
            participant_id,
            cell: Mutex::new(SessionCell {
                session,
                countdown: None,
            }),
            events,
            last_activity: StdMutex::new(Instant::now()),
        });

        let view = {
            let mut cell = handle.cell.lock().await;
            self.enter_question(&handle, &mut cell);
            SessionView::from_session(&token, &cell.session)
        };

        self.sessions.write().await.insert(token.clone(), handle);
        info!(
            %quiz_id,
            questions = view.question_count,
            anonymous = participant_id.is_none(),
            "quiz session started"
        );
        Ok(view)
    }

    pub async fn snapshot(&self, token: &str) -> Result<SessionView> {
        let handle = self.handle(token).await?;
        handle.touch();
        let cell = handle.cell.lock().await;
        Ok(SessionView::from_session(&handle.token, &cell.session))
    }

    pub async fn answer(&self, token: &str, label: &str) -> Result<SessionActionResponse> {
        let handle = self.handle(token).await?;
        handle.touch();

        let mut cell = handle.cell.lock().await;
        let notification = match cell.session.submit_answer(label) {
            Some(outcome) => {
                cell.stop_countdown();
                let notification = notification_for(outcome.correct).to_string();
                let reveal = cell.session.options().reveal_explanations;
                handle.publish(SessionEvent::answer_recorded(outcome, reveal));
                Some(notification)
            }
            None => {
                debug!(token = %handle.token, "answer ignored");
                None
            }
        };

        Ok(SessionActionResponse {
            accepted: notification.is_some(),
            notification,
            session: SessionView::from_session(&handle.token, &cell.session),
        })
    }

    pub async fn next(&self, token: &str) -> Result<SessionActionResponse> {
        let handle = self.handle(token).await?;
        handle.touch();

        let mut cell = handle.cell.lock().await;
        let advance = cell.session.advance(AdvanceTrigger::User);
        let accepted = self.apply_advance(&handle, &mut cell, advance);
        if !accepted {
            debug!(token = %handle.token, "advance ignored");
        }

        Ok(SessionActionResponse {
            accepted,
            notification: None,
            session: SessionView::from_session(&handle.token, &cell.session),
        })
    }

    pub async fn subscribe(
        &self,
        token: &str,
    ) -> Result<(broadcast::Receiver<SessionEvent>, SessionView)> {
        let handle = self.handle(token).await?;
        handle.touch();
        let cell = handle.cell.lock().await;
        let receiver = handle.events.subscribe();
        Ok((receiver, SessionView::from_session(&handle.token, &cell.session)))
    }

    pub async fn discard(&self, token: &str) -> Result<()> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(token)
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;
        handle.cell.lock().await.stop_countdown();
        info!(token = %handle.token, "quiz session discarded");
        Ok(())
    }

    /// Drops sessions idle longer than the configured TTL.
    pub async fn purge_idle(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<Arc<SessionHandle>> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<String> = sessions
                .iter()
                .filter(|(_, handle)| handle.idle_for(now) > self.settings.idle_ttl)
                .map(|(token, _)| token.clone())
                .collect();
            stale.iter().filter_map(|t| sessions.remove(t)).collect()
        };

        for handle in &expired {
            handle.cell.lock().await.stop_countdown();
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "purged idle quiz sessions");
        }
        expired.len()
    }

    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                service.purge_idle().await;
            }
        })
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn handle(&self, token: &str) -> Result<Arc<SessionHandle>> {
        self.sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    fn enter_question(&self, handle: &Arc<SessionHandle>, cell: &mut SessionCell) {
        cell.stop_countdown();
        let index = cell.session.current_index();
        if cell.session.is_timed() {
            cell.countdown = Some(self.arm(handle, index));
        }
        handle.publish(SessionEvent::QuestionStarted {
            index,
            question_count: cell.session.question_count(),
            time_remaining: cell.session.time_remaining(),
        });
    }

    fn arm(&self, handle: &Arc<SessionHandle>, owner: usize) -> Countdown {
        let weak = Arc::downgrade(handle);
        let service = self.clone();
        Countdown::start(owner, self.settings.tick_interval, move || {
            let weak = weak.clone();
            let service = service.clone();
            async move {
                let Some(handle) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                let mut cell = handle.cell.lock().await;
                service.on_tick(&handle, &mut cell, owner)
            }
        })
    }

    fn on_tick(
        &self,
        handle: &Arc<SessionHandle>,
        cell: &mut SessionCell,
        owner: usize,
    ) -> ControlFlow<()> {
        if cell.session.state() != SessionState::InProgress || cell.session.current_index() != owner
        {
            debug!(owner, "stale countdown tick dropped");
            return ControlFlow::Break(());
        }

        match cell.session.tick() {
            Tick::Idle => ControlFlow::Break(()),
            Tick::Counting(time_remaining) => {
                handle.publish(SessionEvent::TimerTick {
                    index: owner,
                    time_remaining,
                });
                ControlFlow::Continue(())
            }
            Tick::Expired => {
                handle.publish(SessionEvent::TimerTick {
                    index: owner,
                    time_remaining: 0,
                });
                handle.publish(SessionEvent::TimeExpired { index: owner });
                let advance = cell.session.advance(AdvanceTrigger::Timeout);
                self.apply_advance(handle, cell, advance);
                ControlFlow::Break(())
            }
        }
    }

    fn apply_advance(
        &self,
        handle: &Arc<SessionHandle>,
        cell: &mut SessionCell,
        advance: Advance,
    ) -> bool {
        match advance {
            Advance::Ignored => false,
            Advance::Moved { .. } => {
                self.enter_question(handle, cell);
                true
            }
            Advance::Completed(summary) => {
                cell.stop_countdown();
                handle.publish(SessionEvent::quiz_completed(&summary));
                info!(
                    token = %handle.token,
                    quiz_id = %summary.quiz_id,
                    correct_answers = summary.correct_answers,
                    points = summary.points,
                    perfect = summary.perfect,
                    "quiz session completed"
                );
                self.persist(handle, &summary);
                true
            }
        }
    }

    /// Fire-and-forget attempt write. Anonymous sessions are not saved.
    fn persist(&self, handle: &Arc<SessionHandle>, summary: &AttemptSummary) {
        let Some(user_id) = handle.participant_id else {
            debug!(token = %handle.token, "anonymous session, attempt not saved");
            return;
        };

        let attempt = summary.to_attempt(Some(user_id));
        let attempts = self.attempts.clone();
        let handle = Arc::clone(handle);
        tokio::spawn(async move {
            if let Err(e) = attempts.record_attempt(&attempt).await {
                error!(error = ?e, token = %handle.token, "failed to save quiz attempt");
                handle.publish(SessionEvent::AttemptSaveFailed {
                    message: "Your results could not be saved.".to_string(),
                });
            }
        });
    }
}
