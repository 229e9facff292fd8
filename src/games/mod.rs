//! The mini-games
//!
//! Every game is an independent engine that owns its published state, its
//! RNG and its timers. Nothing is shared between games; the `arcade` shell
//! only decides which one receives input and time.

pub mod counting;
pub mod drawing;
pub mod jigsaw;
pub mod jumping;
pub mod letters;
pub mod math;
pub mod maze;
pub mod words;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::highscores::ScoreBoard;
use crate::sim::Viewport;

pub use counting::CountingEngine;
pub use drawing::DrawingEngine;
pub use jigsaw::JigsawEngine;
pub use jumping::JumpingEngine;
pub use letters::LettersEngine;
pub use math::MathEngine;
pub use maze::MazeEngine;
pub use words::WordsEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameKind {
    Counting,
    Letters,
    Maze,
    Jigsaw,
    Jumping,
    Math,
    Words,
    Drawing,
}

impl GameKind {
    pub const ALL: [GameKind; 8] = [
        GameKind::Counting,
        GameKind::Letters,
        GameKind::Maze,
        GameKind::Jigsaw,
        GameKind::Jumping,
        GameKind::Math,
        GameKind::Words,
        GameKind::Drawing,
    ];

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Counting => "Counting Objects",
            GameKind::Letters => "Drawing Letters",
            GameKind::Maze => "Maze",
            GameKind::Jigsaw => "Jigsaw Puzzle",
            GameKind::Jumping => "Jumping Game",
            GameKind::Math => "Math Game",
            GameKind::Words => "Words Game",
            GameKind::Drawing => "Free Drawing",
        }
    }

    /// RNG stream index, so each game draws from its own sequence
    pub fn stream(self) -> u64 {
        self as u64 + 1
    }
}

/// Input and lifecycle surface every engine exposes to the host.
///
/// Positions are normalized to `[0, 1]` per axis of the game's canvas.
/// Input a game has no use for is ignored.
pub trait MiniGame {
    fn kind(&self) -> GameKind;

    fn on_tap(&mut self, _pos: Vec2) {}

    fn on_drag_start(&mut self, _pos: Vec2) {}

    fn on_drag_move(&mut self, _pos: Vec2) {}

    fn on_drag_end(&mut self, _pos: Vec2) {}

    /// Canvas size changed
    fn resize(&mut self, _viewport: Viewport) {}

    /// Show or hide the game's settings dialog
    fn toggle_settings(&mut self) {}

    /// "Try again" after a wrong verdict
    fn reset_round(&mut self) {}

    /// Let `elapsed` of virtual time pass, firing due timers
    fn advance(&mut self, elapsed: Duration);

    /// Host navigated away: cancel every timer
    fn pause(&mut self);

    /// Host came back
    fn resume(&mut self);

    fn scores(&self) -> ScoreBoard;

    /// Armed timers, for leak checks
    fn pending_timers(&self) -> usize;

    /// Publish counter of the game's state
    fn version(&self) -> u64;
}

/// Animal shown next to quiz questions; purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mascot {
    #[default]
    Hippo,
    Whale,
    Squirrel,
    Crane,
}

impl Mascot {
    pub const ALL: [Mascot; 4] = [Mascot::Hippo, Mascot::Whale, Mascot::Squirrel, Mascot::Crane];

    /// Any mascot, possibly the current one
    pub fn random<R: rand::Rng>(rng: &mut R) -> Mascot {
        Mascot::ALL[rng.random_range(0..Mascot::ALL.len())]
    }

    /// A mascot different from `current`
    pub fn next_after<R: rand::Rng>(current: Mascot, rng: &mut R) -> Mascot {
        let others: Vec<Mascot> = Mascot::ALL.into_iter().filter(|m| *m != current).collect();
        others[rng.random_range(0..others.len())]
    }
}
