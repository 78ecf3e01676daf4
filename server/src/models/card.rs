use serde::{Deserialize, Serialize};

use super::question::Question;

/// Explicit per-card countdown state machine.
///
/// `Expired` and `Answered` are terminal; no transition ever leaves them.
/// At most one ticker task exists per card while `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// Created, never started. The card has not been scrolled into view yet.
    Idle,
    Running,
    Paused,
    /// Ran out of time with no answer chosen.
    Expired,
    /// Stopped by a user answer.
    Answered,
}

impl TimerPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TimerPhase::Expired | TimerPhase::Answered)
    }
}

#[derive(Debug, Clone)]
pub struct TimerState {
    /// Seconds left. Monotonically decreasing, clamped to 0 on expiry, frozen
    /// at the captured value on answer.
    pub remaining: f32,
    /// Fixed at creation from the difficulty lookup.
    pub total: f32,
    pub phase: TimerPhase,
}

impl TimerState {
    pub fn new(total: f32) -> Self {
        Self {
            remaining: total,
            total,
            phase: TimerPhase::Idle,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

/// Wire view of a timer, with the phase flattened into the booleans the
/// original feed client renders from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub remaining: f32,
    pub total: f32,
    pub running: bool,
    pub paused: bool,
    pub done: bool,
}

impl From<&TimerState> for TimerView {
    fn from(timer: &TimerState) -> Self {
        Self {
            remaining: timer.remaining,
            total: timer.total,
            running: timer.phase == TimerPhase::Running,
            paused: timer.phase == TimerPhase::Paused,
            done: timer.is_terminal(),
        }
    }
}

/// One question instance in the feed, with its own countdown and answer state.
#[derive(Debug, Clone)]
pub struct CardState {
    pub question: Question,
    /// Chosen option index. Mutually exclusive with `timed_out`.
    pub chosen: Option<usize>,
    pub timed_out: bool,
    pub timer: TimerState,
}

impl CardState {
    pub fn new(question: Question, total_seconds: f32) -> Self {
        Self {
            question,
            chosen: None,
            timed_out: false,
            timer: TimerState::new(total_seconds),
        }
    }

    /// True once the card reached a terminal state by answer or expiry.
    pub fn is_answered(&self) -> bool {
        self.chosen.is_some() || self.timed_out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardView {
    pub question: Question,
    pub chosen: Option<usize>,
    pub timed_out: bool,
    pub timer: TimerView,
}

impl From<&CardState> for CardView {
    fn from(card: &CardState) -> Self {
        Self {
            question: card.question.clone(),
            chosen: card.chosen,
            timed_out: card.timed_out,
            timer: TimerView::from(&card.timer),
        }
    }
}
