use chrono::Utc;
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use uuid::Uuid;

use crate::catalog::{time_limit_for, Catalog};
use crate::models::events::{
    AnswerResult, BatchLoaded, Celebration, GameEvent, MilestoneReached, PoolExhausted, SoundCue,
    TimeExpired, TimerTick,
};
use crate::models::{
    CardState, CardView, SessionSnapshot, SubmitAnswerResponse, TimerPhase, CROSS_CATEGORY,
};

use super::pool_service::{DrawOutcome, QuestionPool};
use super::scheduler::CardTimerScheduler;
use super::scoring_service::{feedback_text, score_answer};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Session not found")]
    NotFound,
    #[error("Session is no longer running")]
    Closed,
    #[error("Unknown category filter: {0}")]
    UnknownFilter(String),
}

/// Engine tunables shared by every session.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub tick_interval: Duration,
    pub batch_size: usize,
}

impl EngineSettings {
    /// Seconds subtracted per tick, derived so countdowns track wall time.
    pub fn tick_step(&self) -> f32 {
        self.tick_interval.as_secs_f32()
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            batch_size: 3,
        }
    }
}

/// Inbound messages for one session's event loop. Everything that touches
/// session state arrives here, so per-card ticks, visibility changes and
/// answers are serialized by construction.
#[derive(Debug)]
pub enum Command {
    Visibility {
        card: usize,
        visible: bool,
    },
    Tick {
        card: usize,
        epoch: u64,
    },
    Answer {
        card: usize,
        option: usize,
        reply: oneshot::Sender<SubmitAnswerResponse>,
    },
    ChangeFilter {
        filter: String,
        reply: oneshot::Sender<Result<SessionSnapshot, EngineError>>,
    },
    LoadMore {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown,
}

/// Cheap clonable front for a running session loop.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<GameEvent>,
}

impl SessionHandle {
    pub async fn snapshot(&self) -> Result<SessionSnapshot, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot { reply: tx })
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    /// Visibility changes are fire-and-forget; unknown cards are dropped
    /// silently inside the loop.
    pub fn set_visibility(&self, card: usize, visible: bool) -> Result<(), EngineError> {
        self.commands
            .send(Command::Visibility { card, visible })
            .map_err(|_| EngineError::Closed)
    }

    pub async fn answer(
        &self,
        card: usize,
        option: usize,
    ) -> Result<SubmitAnswerResponse, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Answer {
                card,
                option,
                reply: tx,
            })
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub async fn change_filter(&self, filter: String) -> Result<SessionSnapshot, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::ChangeFilter { filter, reply: tx })
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)?
    }

    pub async fn load_more(&self) -> Result<SessionSnapshot, EngineError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::LoadMore { reply: tx })
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

/// Registry of live sessions, keyed by id.
pub struct SessionService {
    catalog: Arc<Catalog>,
    settings: EngineSettings,
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionService {
    pub fn new(catalog: Arc<Catalog>, settings: EngineSettings) -> Self {
        Self {
            catalog,
            settings,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(
        &self,
        filter: Option<String>,
    ) -> Result<(Uuid, SessionSnapshot), EngineError> {
        let filter = filter.unwrap_or_else(|| CROSS_CATEGORY.to_string());

        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(256);
        let mut inner = SessionInner::new(
            self.catalog.clone(),
            &self.settings,
            cmd_tx.clone(),
            event_tx.clone(),
            &filter,
        )?;
        let snapshot = inner.snapshot();

        let id = Uuid::new_v4();
        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                if inner.handle_command(cmd).is_break() {
                    break;
                }
            }
            inner.teardown();
            tracing::debug!("Session loop stopped");
        });

        let handle = SessionHandle {
            commands: cmd_tx,
            events: event_tx,
        };
        self.sessions.write().await.insert(id, handle);

        tracing::info!(session_id = %id, %filter, "Session created");
        Ok((id, snapshot))
    }

    pub async fn handle(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Tear a session down: the loop aborts every ticker before exiting, so
    /// no expiration path can fire after removal.
    pub async fn remove(&self, id: &Uuid) -> bool {
        match self.sessions.write().await.remove(id) {
            Some(handle) => {
                handle.shutdown();
                tracing::info!(session_id = %id, "Session removed");
                true
            }
            None => false,
        }
    }
}

/// The single writer for one session's state. Owned by the event loop task;
/// nothing outside the loop ever holds a reference to it.
struct SessionInner {
    catalog: Arc<Catalog>,
    scheduler: CardTimerScheduler,
    events: broadcast::Sender<GameEvent>,
    tick_step: f32,

    cards: Vec<CardState>,
    pool: QuestionPool,
    score: u32,
    streak: u32,
    best_streak: u32,
    correct_count: u32,
    total_answered: u32,
    has_more: bool,
}

impl SessionInner {
    fn new(
        catalog: Arc<Catalog>,
        settings: &EngineSettings,
        commands: mpsc::UnboundedSender<Command>,
        events: broadcast::Sender<GameEvent>,
        filter: &str,
    ) -> Result<Self, EngineError> {
        if !catalog.has_filter(filter) {
            return Err(EngineError::UnknownFilter(filter.to_string()));
        }

        let pool = QuestionPool::new(catalog.clone(), filter, settings.batch_size);
        let mut inner = Self {
            catalog,
            scheduler: CardTimerScheduler::new(settings.tick_interval, commands),
            events,
            tick_step: settings.tick_step(),
            cards: Vec::new(),
            pool,
            score: 0,
            streak: 0,
            best_streak: 0,
            correct_count: 0,
            total_answered: 0,
            has_more: true,
        };
        inner.load_batch();
        Ok(inner)
    }

    fn handle_command(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Visibility { card, visible } => self.handle_visibility(card, visible),
            Command::Tick { card, epoch } => self.handle_tick(card, epoch),
            Command::Answer {
                card,
                option,
                reply,
            } => {
                let _ = reply.send(self.handle_answer(card, option));
            }
            Command::ChangeFilter { filter, reply } => {
                let _ = reply.send(self.handle_filter_change(&filter));
            }
            Command::LoadMore { reply } => {
                let _ = reply.send(self.handle_load_more());
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Card scrolled into or out of view. Unknown indices and terminal cards
    /// are silently ignored.
    fn handle_visibility(&mut self, card: usize, visible: bool) {
        let Some(state) = self.cards.get_mut(card) else {
            return;
        };
        if state.timer.is_terminal() {
            return;
        }

        if visible {
            // Idempotent start: overlapping visibility signals must never
            // create a second countdown for the same card.
            if self.scheduler.is_active(card) {
                return;
            }
            state.timer.phase = TimerPhase::Running;
            self.scheduler.start(card);
        } else {
            self.scheduler.stop(card);
            if state.timer.phase == TimerPhase::Running {
                state.timer.phase = TimerPhase::Paused;
            }
        }
    }

    fn handle_tick(&mut self, card: usize, epoch: u64) {
        // Ticks from before the last filter change target indices that may
        // have been reused; drop them.
        if epoch != self.scheduler.epoch() {
            return;
        }
        let Some(state) = self.cards.get_mut(card) else {
            self.scheduler.stop(card);
            return;
        };
        if state.timer.is_terminal() {
            self.scheduler.stop(card);
            return;
        }
        if state.timer.phase != TimerPhase::Running {
            return;
        }

        let before = state.timer.remaining;
        let after = before - self.tick_step;
        if after <= 0.0 {
            self.expire(card);
            return;
        }

        state.timer.remaining = after;
        let total = state.timer.total;
        // Audible tick on each displayed second under six.
        if after.ceil() <= 5.0 && after.ceil() != before.ceil() {
            self.emit(GameEvent::sound(SoundCue::Tick));
        }
        self.emit(GameEvent::TimerTick(TimerTick {
            card,
            remaining_seconds: after,
            total_seconds: total,
            timestamp: Utc::now(),
        }));
    }

    /// No-answer terminal path. Runs at most once per card; later ticks hit
    /// the terminal guard in `handle_tick`.
    fn expire(&mut self, card: usize) {
        self.scheduler.stop(card);

        let state = &mut self.cards[card];
        state.timer.remaining = 0.0;
        state.timer.phase = TimerPhase::Expired;
        state.timed_out = true;

        let outcome = score_answer(self.streak, false, 0.0);
        self.streak = outcome.new_streak;
        self.total_answered += 1;

        tracing::info!(card, "Card expired without an answer");
        self.emit(GameEvent::TimeExpired(TimeExpired {
            card,
            timestamp: Utc::now(),
        }));
        self.emit(GameEvent::sound(SoundCue::Timeout));
    }

    fn handle_answer(&mut self, card: usize, option: usize) -> SubmitAnswerResponse {
        let Some(state) = self.cards.get_mut(card) else {
            return SubmitAnswerResponse::ignored();
        };
        if state.is_answered() || state.timer.is_terminal() {
            // Duplicate answer, or an answer racing an expiry that already
            // landed: idempotent no-op.
            return SubmitAnswerResponse::ignored();
        }

        // Snapshot before the terminal transition; the speed bonus must see
        // the value at the moment the answer landed.
        let remaining = state.timer.remaining;
        state.chosen = Some(option);
        state.timer.phase = TimerPhase::Answered;
        let correct = option == state.question.answer;
        self.scheduler.stop(card);

        let outcome = score_answer(self.streak, correct, remaining);
        self.score += outcome.points;
        self.streak = outcome.new_streak;
        self.best_streak = self.best_streak.max(outcome.new_streak);
        self.total_answered += 1;
        if correct {
            self.correct_count += 1;
        }

        tracing::info!(
            card,
            correct,
            points = outcome.points,
            streak = outcome.new_streak,
            "Answer processed"
        );

        self.emit(GameEvent::sound(if correct {
            SoundCue::Correct
        } else {
            SoundCue::Wrong
        }));
        self.emit(GameEvent::AnswerResult(AnswerResult {
            card,
            correct,
            points_awarded: outcome.points,
            streak: outcome.new_streak,
            total_score: self.score,
        }));
        if let Some(milestone) = outcome.milestone {
            self.emit(GameEvent::Milestone(MilestoneReached {
                streak: outcome.new_streak,
                label: milestone.label().to_string(),
            }));
            self.emit(GameEvent::sound(SoundCue::Combo));
        }
        if outcome.celebration {
            self.emit(GameEvent::Celebration(Celebration {
                streak: outcome.new_streak,
            }));
        }

        let feedback = feedback_text(correct, outcome.speed_tier, outcome.points);
        SubmitAnswerResponse {
            accepted: true,
            correct,
            points_awarded: outcome.points,
            streak: outcome.new_streak,
            best_streak: self.best_streak,
            total_score: self.score,
            remaining_at_answer: remaining,
            milestone: outcome.milestone.map(|m| m.label().to_string()),
            celebration: outcome.celebration,
            speed_tier: outcome.speed_tier.map(|t| t.label().to_string()),
            feedback: Some(feedback),
        }
    }

    /// Switch category: every outstanding ticker is cancelled (and the epoch
    /// bumped) before the pool is rebuilt and new cards reuse the indices.
    fn handle_filter_change(&mut self, filter: &str) -> Result<SessionSnapshot, EngineError> {
        if !self.catalog.has_filter(filter) {
            return Err(EngineError::UnknownFilter(filter.to_string()));
        }

        self.scheduler.cancel_all();
        self.cards.clear();
        self.has_more = true;
        self.pool.reset(filter);
        self.load_batch();

        tracing::info!(%filter, "Filter changed, feed rebuilt");
        Ok(self.snapshot())
    }

    fn handle_load_more(&mut self) -> SessionSnapshot {
        if self.has_more {
            self.load_batch();
        }
        self.snapshot()
    }

    /// Draw the next batch into the feed. Exhaustion flips `has_more` and is
    /// reported as an event, never as an error.
    fn load_batch(&mut self) -> bool {
        match self.pool.draw_batch() {
            DrawOutcome::Batch(batch) => {
                let count = batch.len();
                for question in batch {
                    let total = time_limit_for(question.difficulty);
                    self.cards.push(CardState::new(question, total));
                }
                self.emit(GameEvent::BatchLoaded(BatchLoaded {
                    count,
                    filter: self.pool.filter().to_string(),
                }));
                self.emit(GameEvent::sound(SoundCue::Start));
                true
            }
            DrawOutcome::Exhausted => {
                self.has_more = false;
                self.emit(GameEvent::PoolExhausted(PoolExhausted {
                    filter: self.pool.filter().to_string(),
                }));
                false
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cards: self.cards.iter().map(CardView::from).collect(),
            score: self.score,
            streak: self.streak,
            best_streak: self.best_streak,
            correct_count: self.correct_count,
            total_answered: self.total_answered,
            active_filter: self.pool.filter().to_string(),
            has_more: self.has_more,
        }
    }

    fn teardown(&mut self) {
        self.scheduler.cancel_all();
    }

    /// Outbound notifications are fire-and-forget: a missing or lagging
    /// subscriber never affects a state transition.
    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }
}
