//! Streak-based scoring rules.
//!
//! Pure functions of the pre-answer session counters; the session loop applies
//! the outcome as one atomic state update.

/// Fixed streak values that fire a one-off banner. Not a modulus: streak 13
/// re-fires nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    OnFire,
    Unstoppable,
    Elite,
    Legendary,
}

impl Milestone {
    pub fn for_streak(streak: u32) -> Option<Self> {
        match streak {
            3 => Some(Milestone::OnFire),
            5 => Some(Milestone::Unstoppable),
            8 => Some(Milestone::Elite),
            10 => Some(Milestone::Legendary),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Milestone::OnFire => "on fire",
            Milestone::Unstoppable => "unstoppable",
            Milestone::Elite => "elite",
            Milestone::Legendary => "legendary",
        }
    }
}

/// Feedback tier based on seconds left at the moment of a correct answer.
/// Thresholds are absolute, so a 10-second hard question can never reach the
/// top tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    Lightning,
    Speedy,
    Standard,
}

impl SpeedTier {
    pub fn for_remaining(remaining: f32) -> Self {
        if remaining >= 12.0 {
            SpeedTier::Lightning
        } else if remaining >= 8.0 {
            SpeedTier::Speedy
        } else {
            SpeedTier::Standard
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedTier::Lightning => "lightning",
            SpeedTier::Speedy => "speedy",
            SpeedTier::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub points: u32,
    pub new_streak: u32,
    pub milestone: Option<Milestone>,
    /// Fires on every positive multiple of 3, independently of milestones;
    /// both trigger together at streak 3.
    pub celebration: bool,
    pub speed_tier: Option<SpeedTier>,
}

/// Score one terminal card transition.
///
/// `remaining` is the captured remaining-at-answer value; for the no-answer
/// (expiry) path callers pass `correct = false` and the value is ignored.
pub fn score_answer(streak_before: u32, correct: bool, remaining: f32) -> ScoreOutcome {
    if !correct {
        return ScoreOutcome {
            points: 0,
            new_streak: 0,
            milestone: None,
            celebration: false,
            speed_tier: None,
        };
    }

    let multiplier = streak_before.max(1);
    let speed_bonus = (remaining * 3.0).round() as u32;
    let new_streak = streak_before + 1;

    ScoreOutcome {
        points: 10 * multiplier + speed_bonus,
        new_streak,
        milestone: Milestone::for_streak(new_streak),
        celebration: new_streak % 3 == 0,
        speed_tier: Some(SpeedTier::for_remaining(remaining)),
    }
}

/// Feedback line shown under the answer, tiered by speed.
pub fn feedback_text(correct: bool, tier: Option<SpeedTier>, points: u32) -> String {
    if !correct {
        return "Incorrect answer".to_string();
    }
    match tier {
        Some(SpeedTier::Lightning) => format!("LIGHTNING! +{}pts", points),
        Some(SpeedTier::Speedy) => format!("SPEEDY! +{}pts", points),
        _ => format!("+{}pts", points),
    }
}
