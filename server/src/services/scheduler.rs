use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::session_service::Command;

/// Per-card countdown tickers for one session.
///
/// A ticker is a tokio task that does nothing but send `Tick` commands into
/// the session's command queue; every state mutation happens in the session
/// loop, so a pause or stop can always pre-empt a tick that is still queued.
/// Pausing, stopping, expiring, and teardown all abort the task, releasing
/// the timer resource.
pub struct CardTimerScheduler {
    tick_interval: Duration,
    commands: mpsc::UnboundedSender<Command>,
    tickers: HashMap<usize, JoinHandle<()>>,
    /// Bumped whenever all tickers are cancelled (filter change). Ticks
    /// carrying an older epoch are dropped by the session loop, which guards
    /// against card indices being reused by the next batch.
    epoch: u64,
}

impl CardTimerScheduler {
    pub fn new(tick_interval: Duration, commands: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            tick_interval,
            commands,
            tickers: HashMap::new(),
            epoch: 0,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_active(&self, card: usize) -> bool {
        self.tickers.contains_key(&card)
    }

    pub fn active_count(&self) -> usize {
        self.tickers.len()
    }

    /// Begin ticking for a card. Idempotent: a card with a live ticker never
    /// gets a second one.
    pub fn start(&mut self, card: usize) {
        if self.tickers.contains_key(&card) {
            return;
        }

        let commands = self.commands.clone();
        let epoch = self.epoch;
        let interval = self.tick_interval;
        let handle = tokio::spawn(async move {
            // First tick fires one full interval from now, not immediately.
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if commands.send(Command::Tick { card, epoch }).is_err() {
                    // Session loop is gone; nothing left to tick for.
                    break;
                }
            }
        });
        self.tickers.insert(card, handle);
    }

    /// Abort the ticker for a card, if any. Safe to call for cards that were
    /// never started.
    pub fn stop(&mut self, card: usize) {
        if let Some(handle) = self.tickers.remove(&card) {
            handle.abort();
        }
    }

    /// Abort every ticker and invalidate all in-flight ticks. Must run before
    /// a new batch can reuse card indices.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tickers.drain() {
            handle.abort();
        }
        self.epoch += 1;
    }
}

impl Drop for CardTimerScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tickers.drain() {
            handle.abort();
        }
    }
}
