use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::leaderboard::{LeaderboardEntry, SubmitScoreRequest, MAX_ENTRIES};

/// In-memory top-20 board shared across sessions. Names are matched
/// case-insensitively; a resubmission only sticks when it beats the stored
/// score.
pub struct LeaderboardService {
    entries: RwLock<Vec<LeaderboardEntry>>,
}

impl LeaderboardService {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Current board, highest score first, at most 20 entries.
    pub async fn list(&self) -> Vec<LeaderboardEntry> {
        self.entries.read().await.clone()
    }

    /// Upsert a score and return its 1-based rank, or `None` when it fell off
    /// the board.
    pub async fn submit(&self, request: SubmitScoreRequest) -> Option<usize> {
        let name = request.name.trim().to_string();
        let entry = LeaderboardEntry {
            name: name.clone(),
            score: request.score,
            streak: request.streak,
            correct: request.correct,
            total: request.total,
            submitted_at: Utc::now(),
        };

        let mut entries = self.entries.write().await;
        match entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(&name))
        {
            Some(idx) if entries[idx].score >= entry.score => {
                // Existing entry wins; report where it already sits.
                tracing::debug!(%name, "Leaderboard submission below stored score");
                return Some(idx + 1);
            }
            Some(idx) => {
                entries[idx] = entry;
            }
            None => {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);

        let rank = entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(&name))
            .map(|idx| idx + 1);
        tracing::info!(%name, score = request.score, ?rank, "Leaderboard updated");
        rank
    }
}

impl Default for LeaderboardService {
    fn default() -> Self {
        Self::new()
    }
}
