use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::{Category, Question, CROSS_CATEGORY};

/// Seconds granted per difficulty level. Unknown difficulties fall back to 15.
pub fn time_limit_for(difficulty: u8) -> f32 {
    match difficulty {
        1 => 20.0,
        2 => 18.0,
        3 => 15.0,
        4 => 12.0,
        5 => 10.0,
        _ => 15.0,
    }
}

/// The static question catalog. Loaded once at startup and never mutated;
/// the pool manager works on filtered, shuffled copies.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub questions: Vec<Question>,
}

impl Catalog {
    /// Catalog shipped inside the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(include_str!("../assets/questions.json"))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let catalog: Catalog =
            serde_json::from_str(raw).context("Failed to parse question catalog")?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// True for the cross-category feed or any known category id.
    pub fn has_filter(&self, filter: &str) -> bool {
        filter == CROSS_CATEGORY || self.categories.iter().any(|c| c.id == filter)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for q in &self.questions {
            if !seen.insert(q.id) {
                bail!("Duplicate question id {}", q.id);
            }
            if q.answer >= q.options.len() {
                bail!(
                    "Question {} has correct index {} out of range for {} options",
                    q.id,
                    q.answer,
                    q.options.len()
                );
            }
            if q.category != CROSS_CATEGORY && !self.categories.iter().any(|c| c.id == q.category)
            {
                bail!("Question {} references unknown category {}", q.id, q.category);
            }
        }
        Ok(())
    }
}
