//! State machine for a single quiz attempt.
//!
//! `QuizSession` is synchronous and owns no timers or I/O. Callers drive it
//! with [`QuizSession::submit_answer`], [`QuizSession::advance`] and
//! [`QuizSession::tick`], and act on the returned outcomes (publishing
//! events, re-arming the countdown, persisting the attempt).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::question::{OptionLabel, Question};
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::NewQuizAttempt;

pub const DEFAULT_QUESTION_TIME_LIMIT_SECS: u32 = 30;
pub const POINTS_PER_CORRECT_ANSWER: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Loading,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimerPolicy {
    Countdown { seconds: u32 },
    Untimed,
}

impl TimerPolicy {
    /// Zero seconds means no countdown at all.
    pub fn from_seconds(seconds: u32) -> Self {
        if seconds == 0 {
            TimerPolicy::Untimed
        } else {
            TimerPolicy::Countdown { seconds }
        }
    }

    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimerPolicy::Countdown { seconds } => Some(*seconds),
            TimerPolicy::Untimed => None,
        }
    }
}

/// Presentation knobs that used to be separate page variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub timer: TimerPolicy,
    pub reveal_explanations: bool,
    pub celebrations: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timer: TimerPolicy::Countdown {
                seconds: DEFAULT_QUESTION_TIME_LIMIT_SECS,
            },
            reveal_explanations: true,
            celebrations: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Celebration {
    /// Correct answer.
    Burst,
    /// Quiz finished with every answer correct.
    Grand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub index: usize,
    pub label: String,
    pub correct: bool,
    pub score: u32,
    pub correct_option: OptionLabel,
    pub explanation: Option<String>,
    pub celebration: Option<Celebration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    User,
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub quiz_id: Uuid,
    pub correct_answers: u32,
    pub points: u32,
    /// Declared size of the quiz, used as the stored denominator.
    pub total_questions: i32,
    /// Number of questions actually presented.
    pub question_count: usize,
    pub perfect: bool,
    pub celebration: Option<Celebration>,
}

impl AttemptSummary {
    pub fn to_attempt(&self, user_id: Option<Uuid>) -> NewQuizAttempt {
        NewQuizAttempt {
            user_id,
            quiz_id: self.quiz_id,
            score: self.points as i32,
            total_questions: self.total_questions,
            correct_answers: self.correct_answers as i32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Ignored,
    Moved { index: usize },
    Completed(AttemptSummary),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Counting(u32),
    Expired,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    options: SessionOptions,
    questions: Vec<Question>,
    state: SessionState,
    current_index: usize,
    selected_answer: Option<String>,
    answer_log: BTreeMap<usize, bool>,
    score: u32,
    time_remaining: u32,
}

impl QuizSession {
    pub fn new(quiz: Quiz, options: SessionOptions) -> Self {
        Self {
            quiz,
            options,
            questions: Vec::new(),
            state: SessionState::Loading,
            current_index: 0,
            selected_answer: None,
            answer_log: BTreeMap::new(),
            score: 0,
            time_remaining: options.timer.seconds().unwrap_or(0),
        }
    }

    /// Installs the question list and starts the first question.
    pub fn begin(&mut self, mut questions: Vec<Question>) -> Result<()> {
        if self.state != SessionState::Loading {
            return Err(Error::BadRequest("Session has already been loaded".to_string()));
        }
        if questions.is_empty() {
            return Err(Error::NotFound("Quiz has no questions".to_string()));
        }

        questions.sort_by_key(|q| q.order_index);
        if questions
            .windows(2)
            .any(|pair| pair[0].order_index == pair[1].order_index)
        {
            tracing::warn!(quiz_id = %self.quiz.id, "quiz has duplicate question order indexes");
        }

        self.questions = questions;
        self.state = SessionState::InProgress;
        self.enter_question(0);
        Ok(())
    }

    pub fn submit_answer(&mut self, label: &str) -> Option<AnswerOutcome> {
        if self.state != SessionState::InProgress || self.selected_answer.is_some() {
            return None;
        }

        let index = self.current_index;
        let question = &self.questions[index];
        let correct = label == question.correct_option.as_str();
        let correct_option = question.correct_option;
        let explanation = question.explanation.clone();

        self.selected_answer = Some(label.to_string());
        self.answer_log.insert(index, correct);
        if correct {
            self.score += 1;
        }

        Some(AnswerOutcome {
            index,
            label: label.to_string(),
            correct,
            score: self.score,
            correct_option,
            explanation,
            celebration: (correct && self.options.celebrations).then_some(Celebration::Burst),
        })
    }

    pub fn advance(&mut self, trigger: AdvanceTrigger) -> Advance {
        if self.state != SessionState::InProgress {
            return Advance::Ignored;
        }

        let allowed = match trigger {
            AdvanceTrigger::User => self.selected_answer.is_some(),
            AdvanceTrigger::Timeout => {
                self.is_timed() && self.selected_answer.is_none() && self.time_remaining == 0
            }
        };
        if !allowed {
            return Advance::Ignored;
        }

        if self.current_index + 1 < self.questions.len() {
            let next = self.current_index + 1;
            self.enter_question(next);
            Advance::Moved { index: next }
        } else {
            self.state = SessionState::Complete;
            match self.summary() {
                Some(summary) => Advance::Completed(summary),
                None => Advance::Ignored,
            }
        }
    }

    /// One elapsed timer period for the current question.
    pub fn tick(&mut self) -> Tick {
        if self.state != SessionState::InProgress
            || self.selected_answer.is_some()
            || !self.is_timed()
        {
            return Tick::Idle;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            Tick::Expired
        } else {
            Tick::Counting(self.time_remaining)
        }
    }

    /// Final result, available once the session is complete.
    pub fn summary(&self) -> Option<AttemptSummary> {
        if self.state != SessionState::Complete {
            return None;
        }

        let correct_answers = self.answer_log.values().filter(|correct| **correct).count() as u32;
        let perfect = correct_answers as usize == self.questions.len();
        Some(AttemptSummary {
            quiz_id: self.quiz.id,
            correct_answers,
            points: correct_answers * POINTS_PER_CORRECT_ANSWER,
            total_questions: self.quiz.total_questions,
            question_count: self.questions.len(),
            perfect,
            celebration: (perfect && self.options.celebrations).then_some(Celebration::Grand),
        })
    }

    fn enter_question(&mut self, index: usize) {
        self.current_index = index;
        self.selected_answer = None;
        self.time_remaining = self.options.timer.seconds().unwrap_or(0);
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    pub fn answer_log(&self) -> &BTreeMap<usize, bool> {
        &self.answer_log
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_timed(&self) -> bool {
        self.options.timer.seconds().is_some()
    }

    /// `None` for untimed sessions.
    pub fn time_remaining(&self) -> Option<u32> {
        self.is_timed().then_some(self.time_remaining)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }
}
