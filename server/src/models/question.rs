use serde::{Deserialize, Serialize};

/// Category id used by questions that belong to every filter.
pub const CROSS_CATEGORY: &str = "all";

/// One film/category in the catalog. Drives the filter tabs on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub year: u16,
    pub color: String,
}

/// An immutable multiple-choice question from the static catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub category: String,
    /// 1 (easy) through 5 (hard). Sizes the card countdown.
    pub difficulty: u8,
    pub kind: String,
    pub prompt: String,
    pub options: Vec<String>,
    /// Index into `options`. Invariant: `answer < options.len()`.
    pub answer: usize,
    pub explanation: String,
}

impl Question {
    pub fn matches_filter(&self, filter: &str) -> bool {
        filter == CROSS_CATEGORY || self.category == filter || self.category == CROSS_CATEGORY
    }
}
