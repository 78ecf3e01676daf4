use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fire-and-forget audio cue vocabulary. The host's audio collaborator maps
/// these to actual playback; a missing or failing consumer is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Correct,
    Wrong,
    Timeout,
    Tick,
    Combo,
    Start,
}

/// Outbound engine events, broadcast per session and exposed over SSE.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GameEvent {
    TimerTick(TimerTick),
    TimeExpired(TimeExpired),
    AnswerResult(AnswerResult),
    Milestone(MilestoneReached),
    Celebration(Celebration),
    Sound(SoundEvent),
    BatchLoaded(BatchLoaded),
    PoolExhausted(PoolExhausted),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimerTick {
    pub card: usize,
    pub remaining_seconds: f32,
    pub total_seconds: f32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeExpired {
    pub card: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnswerResult {
    pub card: usize,
    pub correct: bool,
    pub points_awarded: u32,
    pub streak: u32,
    pub total_score: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MilestoneReached {
    pub streak: u32,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Celebration {
    pub streak: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SoundEvent {
    pub cue: SoundCue,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchLoaded {
    pub count: usize,
    pub filter: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolExhausted {
    pub filter: String,
}

impl GameEvent {
    pub fn to_sse_data(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn event_name(&self) -> &'static str {
        match self {
            GameEvent::TimerTick(_) => "timer-tick",
            GameEvent::TimeExpired(_) => "time-expired",
            GameEvent::AnswerResult(_) => "answer-result",
            GameEvent::Milestone(_) => "milestone",
            GameEvent::Celebration(_) => "celebration",
            GameEvent::Sound(_) => "sound",
            GameEvent::BatchLoaded(_) => "batch-loaded",
            GameEvent::PoolExhausted(_) => "pool-exhausted",
        }
    }

    pub fn sound(cue: SoundCue) -> Self {
        GameEvent::Sound(SoundEvent { cue })
    }
}
