//! Configuration errors
//!
//! Gameplay itself never fails: bad input is clamped or ignored. The only
//! fallible surface is configuration, either loaded from disk or changed from
//! a settings dialog.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("range {lo}..={hi} has fewer than {count} distinct values")]
    RangeTooSmall { lo: i32, hi: i32, count: usize },

    #[error("option count {count} is outside {min}..={max}")]
    InvalidOptionCount { count: usize, min: usize, max: usize },

    #[error("word list offers {available} distractors, {requested} requested")]
    NotEnoughWords { available: usize, requested: usize },

    #[error("timer duration must be between {min} and {max} seconds, got {secs}")]
    InvalidTimer { secs: u32, min: u32, max: u32 },

    #[error("at least one math operation must be enabled")]
    NoOperations,

    #[error("settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
