//! Endless runner
//!
//! The player stands still at the left while obstacles scroll in from the
//! right. Everything is in normalized units with y measured up from the
//! ground, and advances one fixed frame per timer tick.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{
    Aabb, GameRng, Published, RoundPhase, Scheduler, Timed, TimerSlot, drive, seeded_rng,
};

/// Simulation frame
pub const FRAME: Duration = Duration::from_millis(16);

// Physics, per frame
pub const GRAVITY: f32 = 0.0018;
pub const JUMP_VELOCITY: f32 = 0.042;

// Scroll speed ramp
pub const START_SPEED: f32 = 0.008;
pub const MAX_SPEED: f32 = 0.016;
pub const SPEED_STEP: f32 = 0.000_008;

/// Spawn gap in frames at start speed, `[min, max)`
pub const START_SPAWN_INTERVAL: (u32, u32) = (90, 180);
/// Spawn gap in frames at max speed
pub const FAST_SPAWN_INTERVAL: (u32, u32) = (50, 90);

pub const OBSTACLE_WIDTH: f32 = 0.08;
pub const OBSTACLE_HEIGHT: f32 = 0.12;
pub const OBSTACLE_SPAWN_X: f32 = 1.0;

pub const PLAYER_LEFT: f32 = 0.12;
pub const PLAYER_RIGHT: f32 = 0.20;
pub const PLAYER_HEIGHT: f32 = 0.15;

/// Forgiveness shaved off each side of an obstacle
pub const HIT_PADDING_X: f32 = 0.01;
/// Forgiveness shaved off the top of an obstacle
pub const HIT_PADDING_TOP: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus,
    Rock,
    Mushroom,
    Flower,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Cactus,
        ObstacleKind::Rock,
        ObstacleKind::Mushroom,
        ObstacleKind::Flower,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Left edge
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Collision box with the forgiving padding applied
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.x, self.right(), 0.0, self.height).shrunk(HIT_PADDING_X, HIT_PADDING_TOP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    /// Height of the feet above the ground
    pub y: f32,
    /// Upward velocity per frame
    pub velocity: f32,
    pub is_jumping: bool,
}

impl Player {
    pub fn is_grounded(&self) -> bool {
        !self.is_jumping && self.y <= 0.0
    }

    pub fn hitbox(&self) -> Aabb {
        Aabb::new(PLAYER_LEFT, PLAYER_RIGHT, self.y, self.y + PLAYER_HEIGHT)
    }

    /// Screen-space anchor for the renderer
    pub fn position(&self) -> Vec2 {
        Vec2::new(PLAYER_LEFT, self.y)
    }
}

/// One frame of gravity. A grounded player is returned unchanged.
pub fn apply_physics(player: Player) -> Player {
    if player.is_grounded() {
        return player;
    }
    let velocity = player.velocity - GRAVITY;
    let y = player.y + velocity;
    if y <= 0.0 {
        Player::default()
    } else {
        Player {
            y,
            velocity,
            is_jumping: true,
        }
    }
}

/// Whether the player touches any obstacle
pub fn check_collision(player: &Player, obstacles: &[Obstacle]) -> bool {
    let body = player.hitbox();
    obstacles.iter().any(|o| body.overlaps(&o.hitbox()))
}

/// 0 at start speed, 1 at max speed
pub fn speed_progress(speed: f32) -> f32 {
    ((speed - START_SPEED) / (MAX_SPEED - START_SPEED)).clamp(0.0, 1.0)
}

/// Spawn gap range `[min, max)` in frames for the current speed
pub fn spawn_interval(speed: f32) -> (u32, u32) {
    let t = speed_progress(speed);
    let lerp = |a: u32, b: u32| (a as f32 + (b as f32 - a as f32) * t).round() as u32;
    let min = lerp(START_SPAWN_INTERVAL.0, FAST_SPAWN_INTERVAL.0);
    let max = lerp(START_SPAWN_INTERVAL.1, FAST_SPAWN_INTERVAL.1).max(min + 1);
    (min, max)
}

fn roll_spawn_gap<R: Rng>(rng: &mut R, speed: f32) -> u64 {
    let (min, max) = spawn_interval(speed);
    rng.random_range(min..max) as u64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpingState {
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub phase: RoundPhase,
    pub speed: f32,
    pub frame: u64,
    pub next_spawn_frame: u64,
    /// Obstacles created this run
    pub spawned: u32,
    pub scores: ScoreBoard,
}

impl JumpingState {
    fn fresh(scores: ScoreBoard) -> Self {
        Self {
            player: Player::default(),
            obstacles: Vec::new(),
            phase: RoundPhase::NotStarted,
            speed: START_SPEED,
            frame: 0,
            next_spawn_frame: 0,
            spawned: 0,
            scores,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }
}

/// Advance one frame. Returns whether the player crashed.
pub fn step_frame<R: Rng>(state: &mut JumpingState, rng: &mut R) -> bool {
    if !state.phase.accepts_input() {
        return false;
    }

    // Physics
    state.player = apply_physics(state.player);

    // Scroll and cull
    let before = state.obstacles.len();
    for obstacle in &mut state.obstacles {
        obstacle.x -= state.speed;
    }
    state.obstacles.retain(|o| o.right() >= 0.0);
    let cleared = (before - state.obstacles.len()) as u32;

    let crashed = check_collision(&state.player, &state.obstacles);

    if cleared > 0 {
        state.scores.add(cleared);
    }

    // Spawn
    state.frame += 1;
    if state.frame >= state.next_spawn_frame {
        let kind = *ObstacleKind::ALL.choose(rng).unwrap_or(&ObstacleKind::Cactus);
        state.obstacles.push(Obstacle {
            x: OBSTACLE_SPAWN_X,
            width: OBSTACLE_WIDTH,
            height: OBSTACLE_HEIGHT,
            kind,
        });
        state.spawned += 1;
        state.next_spawn_frame = state.frame + roll_spawn_gap(rng, state.speed);
    }

    // Difficulty ramp
    state.speed = (state.speed + SPEED_STEP).min(MAX_SPEED);

    if crashed {
        state.phase = RoundPhase::GameOver;
    }
    crashed
}

#[derive(Debug, Clone)]
pub enum JumpingEvent {
    Frame,
}

pub struct JumpingEngine {
    state: Published<JumpingState>,
    rng: GameRng,
    timers: Scheduler<JumpingEvent>,
    loop_slot: TimerSlot,
}

impl JumpingEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Published::new(JumpingState::fresh(ScoreBoard::new())),
            rng: seeded_rng(seed, GameKind::Jumping.stream()),
            timers: Scheduler::new(),
            loop_slot: TimerSlot::new(),
        }
    }

    pub fn state(&self) -> &JumpingState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<JumpingState> {
        self.state.snapshot()
    }

    /// Start a run, wiping any finished one
    pub fn start_game(&mut self) {
        match self.state.get().phase {
            RoundPhase::Active => return,
            RoundPhase::Paused => return self.resume_game(),
            _ => {}
        }
        let mut next = JumpingState::fresh(self.state.get().scores);
        next.scores.reset_score();
        next.phase = RoundPhase::Active;
        next.next_spawn_frame = roll_spawn_gap(&mut self.rng, next.speed);
        self.state.replace(next);
        self.start_loop();
        log::debug!("runner started");
    }

    fn start_loop(&mut self) {
        self.timers
            .arm_repeating(&mut self.loop_slot, FRAME, JumpingEvent::Frame);
    }

    pub fn pause_game(&mut self) {
        if self.state.get().phase == RoundPhase::Active {
            self.state.update(|s| s.phase = RoundPhase::Paused);
        }
        self.timers.cancel(&mut self.loop_slot);
    }

    pub fn resume_game(&mut self) {
        if self.state.get().phase == RoundPhase::Paused {
            self.state.update(|s| s.phase = RoundPhase::Active);
            self.start_loop();
        }
    }

    /// Back to the start screen, keeping the high score
    pub fn reset_game(&mut self) {
        self.timers.cancel(&mut self.loop_slot);
        let scores = ScoreBoard {
            score: 0,
            ..self.state.get().scores
        };
        self.state.replace(JumpingState::fresh(scores));
    }

    /// Jump, if running and on the ground
    pub fn jump(&mut self) -> bool {
        let current = self.state.get();
        if !current.phase.accepts_input() || !current.player.is_grounded() {
            return false;
        }
        self.state.update(|s| {
            s.player = Player {
                y: 0.0,
                velocity: JUMP_VELOCITY,
                is_jumping: true,
            }
        });
        true
    }

    /// Run exactly one frame
    pub fn step(&mut self) {
        if !self.state.get().phase.accepts_input() {
            return;
        }
        let rng = &mut self.rng;
        let mut crashed = false;
        self.state.update(|s| crashed = step_frame(s, rng));
        if crashed {
            self.timers.cancel(&mut self.loop_slot);
            let scores = self.state.get().scores;
            log::info!(
                "runner crashed: score {} (best {})",
                scores.score,
                scores.high_score
            );
        }
    }
}

impl Timed for JumpingEngine {
    type Event = JumpingEvent;

    fn timers(&mut self) -> &mut Scheduler<JumpingEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: JumpingEvent) {
        match event {
            JumpingEvent::Frame => self.step(),
        }
    }
}

impl MiniGame for JumpingEngine {
    fn kind(&self) -> GameKind {
        GameKind::Jumping
    }

    fn on_tap(&mut self, _pos: Vec2) {
        self.jump();
    }

    fn reset_round(&mut self) {
        self.reset_game();
    }

    fn advance(&mut self, elapsed: Duration) {
        drive(self, elapsed);
    }

    fn pause(&mut self) {
        self.pause_game();
    }

    fn resume(&mut self) {
        self.resume_game();
    }

    fn scores(&self) -> ScoreBoard {
        self.state.get().scores
    }

    fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}
