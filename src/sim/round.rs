//! Round lifecycle shared by every mini-game

use serde::{Deserialize, Serialize};

/// Where a game currently is in its round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Content may be shown but input is not accepted yet
    #[default]
    NotStarted,
    /// Accepting input
    Active,
    /// Answer accepted; a delayed advance is pending
    Correct,
    /// Answer rejected; waiting for "try again"
    Incorrect,
    /// Puzzle solved (maze, jigsaw); a delayed advance is pending
    Complete,
    /// Host navigated away or paused; timers are cancelled
    Paused,
    /// Timer ran out or the runner crashed
    GameOver,
}

impl RoundPhase {
    /// Whether user input should change the round
    pub fn accepts_input(self) -> bool {
        self == RoundPhase::Active
    }

    /// Whether a correct/incorrect verdict is showing
    pub fn has_verdict(self) -> bool {
        matches!(
            self,
            RoundPhase::Correct | RoundPhase::Incorrect | RoundPhase::Complete
        )
    }
}

/// Feedback strings shown by the renderer
pub mod messages {
    pub const CORRECT: &str = "Great job!";
    pub const TRY_AGAIN: &str = "Try again!";
    pub const MAZE_SOLVED: &str = "Great job! You solved the maze!";
    pub const PUZZLE_COMPLETE: &str = "Great job! Puzzle complete!";
}

/// Identifies one round so a delayed advance can tell whether it is stale
pub type RoundId = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_accepts_input() {
        assert!(RoundPhase::Active.accepts_input());
        for phase in [
            RoundPhase::NotStarted,
            RoundPhase::Correct,
            RoundPhase::Incorrect,
            RoundPhase::Complete,
            RoundPhase::Paused,
            RoundPhase::GameOver,
        ] {
            assert!(!phase.accepts_input(), "{phase:?}");
        }
    }
}
