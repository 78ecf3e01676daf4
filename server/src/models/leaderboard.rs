use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_ENTRIES: usize = 20;
pub const MAX_NAME_LEN: usize = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub streak: u32,
    pub correct: u32,
    pub total: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Submission payload. Names are trimmed before validation, so a
/// whitespace-only name fails the length check.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitScoreRequest {
    #[validate(custom(function = "validate_trimmed_name"))]
    pub name: String,
    pub score: u32,
    pub streak: u32,
    pub correct: u32,
    pub total: u32,
}

fn validate_trimmed_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(validator::ValidationError::new("name_length")
            .with_message("Name must be between 1 and 24 characters".into()));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitScoreResponse {
    pub success: bool,
    /// 1-based position after the upsert, `None` when the score did not make
    /// the top 20.
    pub rank: Option<usize>,
}
