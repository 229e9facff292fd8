//! Deterministic simulation plumbing
//!
//! Shared by every mini-game. This module must stay pure and deterministic:
//! - Virtual time only (see `scheduler`)
//! - Seeded RNG only
//! - Whole-state publication (see `snapshot`)
//! - No rendering or platform dependencies

pub mod geometry;
pub mod options;
pub mod round;
pub mod scheduler;
pub mod snapshot;

use rand::SeedableRng;
use rand_pcg::Pcg32;

pub use geometry::{Aabb, Viewport, clamp_axes, point_in_circle, point_in_rect, point_in_triangle};
pub use options::unique_options;
pub use round::{RoundId, RoundPhase, messages};
pub use scheduler::{Scheduler, Timed, TimerId, TimerSlot, drive};
pub use snapshot::Published;

/// RNG used by every engine
pub type GameRng = Pcg32;

/// Derive an independent RNG stream for one engine from a session seed.
///
/// Engines built from the same seed but different streams do not share
/// sequences, so switching games never perturbs another game's content.
pub fn seeded_rng(seed: u64, stream: u64) -> GameRng {
    let mixed = seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    Pcg32::seed_from_u64(mixed)
}
