use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::models::Question;

/// Result of drawing from the pool. Exhaustion is a normal terminal
/// condition, not an error, and callers must be able to tell it apart from a
/// (possibly short) batch.
#[derive(Debug)]
pub enum DrawOutcome {
    Batch(Vec<Question>),
    Exhausted,
}

/// Owns the shuffled set of unseen questions for the active filter.
///
/// The catalog itself is never mutated; rebuilds pull a fresh filtered copy
/// and shuffle it. Ids of drawn questions are excluded until the filter
/// changes.
pub struct QuestionPool {
    catalog: Arc<Catalog>,
    filter: String,
    queue: Vec<Question>,
    used: HashSet<u32>,
    batch_size: usize,
}

impl QuestionPool {
    pub fn new(catalog: Arc<Catalog>, filter: &str, batch_size: usize) -> Self {
        let mut pool = Self {
            catalog,
            filter: filter.to_string(),
            queue: Vec::new(),
            used: HashSet::new(),
            batch_size,
        };
        pool.rebuild();
        pool
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn used_ids(&self) -> &HashSet<u32> {
        &self.used
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Switch to a new filter: the used set is cleared and the in-flight pool
    /// discarded, so questions seen under the old filter become eligible
    /// again.
    pub fn reset(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.used.clear();
        self.rebuild();
    }

    /// Draw the next batch. Rebuilds from the catalog first when fewer than a
    /// full batch remains; a rebuilt-but-short pool still yields a short
    /// batch, only an empty rebuild signals exhaustion.
    pub fn draw_batch(&mut self) -> DrawOutcome {
        if self.queue.len() < self.batch_size {
            self.rebuild();
            if self.queue.is_empty() {
                return DrawOutcome::Exhausted;
            }
        }

        let take = self.batch_size.min(self.queue.len());
        let batch: Vec<Question> = self.queue.drain(..take).collect();
        for q in &batch {
            self.used.insert(q.id);
        }
        DrawOutcome::Batch(batch)
    }

    fn rebuild(&mut self) {
        let mut queue: Vec<Question> = self
            .catalog
            .questions
            .iter()
            .filter(|q| q.matches_filter(&self.filter) && !self.used.contains(&q.id))
            .cloned()
            .collect();
        queue.shuffle(&mut rand::rng());
        self.queue = queue;
    }
}
