//! Playroom - engines for a collection of children's learning mini-games
//!
//! Core modules:
//! - `sim`: Deterministic plumbing (virtual-time timers, published snapshots, geometry)
//! - `games`: One engine per mini-game
//! - `arcade`: Owns every engine and routes input and frame time
//! - `settings`: Per-game configuration loaded from JSON
//! - `highscores`: Session score tracking
//!
//! Rendering is left to the host: it polls each engine's snapshot and
//! forwards normalized input positions.

pub mod arcade;
pub mod error;
pub mod games;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use arcade::{Arcade, SettingChange};
pub use error::ConfigError;
pub use games::{GameKind, MiniGame};
pub use highscores::ScoreBoard;
pub use settings::Settings;

/// Shell configuration constants
pub mod consts {
    use std::time::Duration;

    /// Longest frame the arcade forwards to a game
    pub const MAX_FRAME_ELAPSED: Duration = Duration::from_millis(100);
    /// Frame length the headless demo simulates
    pub const DEMO_FRAME: Duration = Duration::from_millis(16);
}
