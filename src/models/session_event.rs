use serde::{Deserialize, Serialize};

use crate::models::question::OptionLabel;
use crate::services::quiz_session::{AnswerOutcome, AttemptSummary, Celebration};

pub const CORRECT_NOTIFICATION: &str = "Correct! 🎉";
pub const WRONG_NOTIFICATION: &str = "Wrong answer. Try the next one!";

/// Events published on a session's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SessionEvent {
    QuestionStarted {
        index: usize,
        question_count: usize,
        time_remaining: Option<u32>,
    },
    TimerTick {
        index: usize,
        time_remaining: u32,
    },
    AnswerRecorded {
        index: usize,
        label: String,
        correct: bool,
        score: u32,
        correct_option: OptionLabel,
        explanation: Option<String>,
        notification: String,
        celebration: Option<Celebration>,
    },
    TimeExpired {
        index: usize,
    },
    QuizCompleted {
        correct_answers: u32,
        question_count: usize,
        points: u32,
        perfect: bool,
        celebration: Option<Celebration>,
    },
    AttemptSaveFailed {
        message: String,
    },
}

impl SessionEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            SessionEvent::QuestionStarted { .. } => "question-started",
            SessionEvent::TimerTick { .. } => "timer-tick",
            SessionEvent::AnswerRecorded { .. } => "answer-recorded",
            SessionEvent::TimeExpired { .. } => "time-expired",
            SessionEvent::QuizCompleted { .. } => "quiz-completed",
            SessionEvent::AttemptSaveFailed { .. } => "attempt-save-failed",
        }
    }

    pub fn to_sse_data(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn answer_recorded(outcome: AnswerOutcome, reveal_explanation: bool) -> Self {
        SessionEvent::AnswerRecorded {
            index: outcome.index,
            notification: notification_for(outcome.correct).to_string(),
            label: outcome.label,
            correct: outcome.correct,
            score: outcome.score,
            correct_option: outcome.correct_option,
            explanation: outcome.explanation.filter(|_| reveal_explanation),
            celebration: outcome.celebration,
        }
    }

    pub fn quiz_completed(summary: &AttemptSummary) -> Self {
        SessionEvent::QuizCompleted {
            correct_answers: summary.correct_answers,
            question_count: summary.question_count,
            points: summary.points,
            perfect: summary.perfect,
            celebration: summary.celebration,
        }
    }
}

pub fn notification_for(correct: bool) -> &'static str {
    if correct {
        CORRECT_NOTIFICATION
    } else {
        WRONG_NOTIFICATION
    }
}
