use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod card;
pub mod events;
pub mod leaderboard;
pub mod question;

pub use card::{CardState, CardView, TimerPhase, TimerState, TimerView};
pub use question::{Category, Question, CROSS_CATEGORY};

/// Full read model of a session, rebuilt on demand by the session loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub cards: Vec<CardView>,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub correct_count: u32,
    pub total_answered: u32,
    pub active_filter: String,
    /// False once the pool for the active filter is exhausted.
    pub has_more: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Category filter; defaults to the cross-category feed.
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub card: usize,
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub card: usize,
    pub option: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    /// False when the card was already terminal (or unknown) and the answer
    /// was ignored as an idempotent no-op.
    pub accepted: bool,
    pub correct: bool,
    pub points_awarded: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub total_score: u32,
    /// Seconds left at the moment the answer landed, captured before the
    /// terminal transition.
    pub remaining_at_answer: f32,
    pub milestone: Option<String>,
    pub celebration: bool,
    pub speed_tier: Option<String>,
    pub feedback: Option<String>,
}

impl SubmitAnswerResponse {
    /// Response for answers that change nothing: terminal cards, unknown
    /// indices.
    pub fn ignored() -> Self {
        Self {
            accepted: false,
            correct: false,
            points_awarded: 0,
            streak: 0,
            best_streak: 0,
            total_score: 0,
            remaining_at_answer: 0.0,
            milestone: None,
            celebration: false,
            speed_tier: None,
            feedback: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeFilterRequest {
    pub filter: String,
}
