//! Score and session high score
//!
//! In memory only. The score resets whenever a game's content-affecting
//! settings change or a new game starts; the high score survives for the
//! lifetime of the engine and never goes down.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    pub score: u32,
    pub high_score: u32,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `points` and raise the high score if beaten
    pub fn add(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
    }

    /// One correct answer / cleared obstacle / solved puzzle
    pub fn record_point(&mut self) {
        self.add(1);
    }

    /// Start a new score run, keeping the high score
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Whether the current run holds the high score
    pub fn is_high_score(&self) -> bool {
        self.score > 0 && self.score == self.high_score
    }
}
