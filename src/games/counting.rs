//! Counting game
//!
//! A handful of identical shapes is scattered over the canvas and the child
//! picks how many there are from four numbers. Tapping a shape greys it out
//! as a counting aid; that toggle never affects the verdict.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, Viewport, drive,
    messages, point_in_circle, point_in_rect, point_in_triangle, seeded_rng, unique_options,
};

/// Answer buttons per round
pub const OPTION_COUNT: usize = 4;
/// Pause between a correct answer and the next round
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);
/// Shape edge as a fraction of the shorter canvas side
pub const SHAPE_SIZE: f32 = 1.0 / 7.0;
/// Rectangles are this fraction of a square tall
pub const RECTANGLE_ASPECT: f32 = 0.6;
/// Placement tries per shape before accepting an overlap
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;
/// Minimum distance between shapes, in shape sizes
pub const MIN_SEPARATION: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CountingDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    SuperHard,
}

impl CountingDifficulty {
    pub const ALL: [CountingDifficulty; 4] = [
        CountingDifficulty::Easy,
        CountingDifficulty::Medium,
        CountingDifficulty::Hard,
        CountingDifficulty::SuperHard,
    ];

    /// Inclusive object-count range
    pub fn range(self) -> (i32, i32) {
        match self {
            CountingDifficulty::Easy => (0, 5),
            CountingDifficulty::Medium => (0, 10),
            CountingDifficulty::Hard => (0, 20),
            CountingDifficulty::SuperHard => (0, 40),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CountingDifficulty::Easy => "Easy",
            CountingDifficulty::Medium => "Medium",
            CountingDifficulty::Hard => "Hard",
            CountingDifficulty::SuperHard => "Super Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Square,
    Triangle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Square,
        ShapeKind::Triangle,
    ];

    /// Hit-test a pixel point against a shape whose bounding box starts at
    /// `top_left` with edge `size`
    pub fn contains(self, point: Vec2, top_left: Vec2, size: f32) -> bool {
        match self {
            ShapeKind::Circle => {
                let center = top_left + Vec2::splat(size / 2.0);
                point_in_circle(point, center, size / 2.0)
            }
            ShapeKind::Rectangle => {
                point_in_rect(point, top_left, Vec2::new(size, size * RECTANGLE_ASPECT))
            }
            ShapeKind::Square => point_in_rect(point, top_left, Vec2::splat(size)),
            ShapeKind::Triangle => {
                let apex = top_left + Vec2::new(size / 2.0, 0.0);
                let bottom_left = top_left + Vec2::new(0.0, size);
                let bottom_right = top_left + Vec2::splat(size);
                point_in_triangle(point, apex, bottom_left, bottom_right)
            }
        }
    }
}

/// One round of the counting game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountingState {
    pub round_id: RoundId,
    pub object_count: i32,
    pub options: Vec<i32>,
    pub shape: ShapeKind,
    /// Normalized top-left corner of every shape, in draw order
    pub positions: Vec<Vec2>,
    /// Indices of shapes the child has tapped
    pub clicked: BTreeSet<usize>,
    pub phase: RoundPhase,
    pub message: Option<&'static str>,
    pub difficulty: CountingDifficulty,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

/// Scatter `count` shapes of normalized edge `size` over the unit canvas.
///
/// Each shape gets up to `MAX_PLACEMENT_ATTEMPTS` tries to land at least
/// `MIN_SEPARATION * size` from every shape already placed. When every try
/// fails the last sample is used anyway, so the count is always exact.
pub fn place_shapes<R: Rng>(rng: &mut R, count: usize, size: f32) -> Vec<Vec2> {
    let min_distance = size * MIN_SEPARATION;
    let span = (1.0 - size).max(0.0);
    let mut placed: Vec<Vec2> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut candidate = Vec2::ZERO;
        let mut separated = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            candidate = Vec2::new(rng.random::<f32>() * span, rng.random::<f32>() * span);
            if placed.iter().all(|p| p.distance(candidate) >= min_distance) {
                separated = true;
                break;
            }
        }
        if !separated {
            log::trace!("shape {} placed with overlap", placed.len());
        }
        placed.push(candidate);
    }

    placed
}

#[derive(Debug, Clone)]
pub enum CountingEvent {
    NextRound(RoundId),
}

pub struct CountingEngine {
    state: Published<CountingState>,
    rng: GameRng,
    timers: Scheduler<CountingEvent>,
    advance_slot: TimerSlot,
    viewport: Viewport,
    paused: bool,
}

impl CountingEngine {
    pub fn new(difficulty: CountingDifficulty, seed: u64) -> Self {
        let mut rng = seeded_rng(seed, GameKind::Counting.stream());
        let initial = Self::generate(&mut rng, 1, difficulty, ScoreBoard::new());
        Self {
            state: Published::new(initial),
            rng,
            timers: Scheduler::new(),
            advance_slot: TimerSlot::new(),
            viewport: Viewport::default(),
            paused: false,
        }
    }

    pub fn state(&self) -> &CountingState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<CountingState> {
        self.state.snapshot()
    }

    fn generate(
        rng: &mut GameRng,
        round_id: RoundId,
        difficulty: CountingDifficulty,
        scores: ScoreBoard,
    ) -> CountingState {
        let (lo, hi) = difficulty.range();
        let object_count = rng.random_range(lo..=hi);
        let options = unique_options(rng, object_count, OPTION_COUNT, lo, hi).unwrap_or_else(|err| {
            log::error!("counting options: {err}");
            vec![object_count]
        });
        let shape = *ShapeKind::ALL.choose(rng).unwrap_or(&ShapeKind::Circle);
        let positions = place_shapes(rng, object_count.max(0) as usize, SHAPE_SIZE);

        CountingState {
            round_id,
            object_count,
            options,
            shape,
            positions,
            clicked: BTreeSet::new(),
            phase: RoundPhase::Active,
            message: None,
            difficulty,
            show_settings: false,
            scores,
        }
    }

    /// Fresh content, neutral feedback, input enabled
    pub fn start_new_round(&mut self) {
        self.timers.cancel(&mut self.advance_slot);
        let current = self.state.get();
        let next = Self::generate(
            &mut self.rng,
            current.round_id + 1,
            current.difficulty,
            current.scores,
        );
        log::debug!(
            "counting round {}: {} x {:?}",
            next.round_id,
            next.object_count,
            next.shape
        );
        self.state.replace(next);
    }

    pub fn select_answer(&mut self, answer: i32) {
        let current = self.state.get();
        if self.paused || !current.phase.accepts_input() {
            return;
        }
        let correct = answer == current.object_count;
        let round_id = current.round_id;

        self.state.update(|s| {
            s.phase = if correct {
                RoundPhase::Correct
            } else {
                RoundPhase::Incorrect
            };
            s.message = Some(if correct {
                messages::CORRECT
            } else {
                messages::TRY_AGAIN
            });
            if correct {
                s.scores.record_point();
            }
        });

        if correct {
            self.timers.arm_once(
                &mut self.advance_slot,
                ADVANCE_DELAY,
                CountingEvent::NextRound(round_id),
            );
        }
    }

    /// "Try again": same content, feedback and taps cleared
    pub fn reset_round(&mut self) {
        if self.state.get().phase != RoundPhase::Incorrect {
            return;
        }
        self.state.update(|s| {
            s.phase = RoundPhase::Active;
            s.message = None;
            s.clicked.clear();
        });
    }

    /// Toggle the greyed-out marker on one shape
    pub fn toggle_object(&mut self, index: usize) {
        let current = self.state.get();
        if self.paused || !current.phase.accepts_input() || index >= current.positions.len() {
            return;
        }
        self.state.update(|s| {
            if !s.clicked.remove(&index) {
                s.clicked.insert(index);
            }
        });
    }

    /// First shape, in draw order, under a normalized tap position
    pub fn hit_test(&self, pos: Vec2) -> Option<usize> {
        let current = self.state.get();
        let tap = self.viewport.to_pixels(pos);
        let size = self.viewport.shorter_side() * SHAPE_SIZE;
        current
            .positions
            .iter()
            .position(|p| current.shape.contains(tap, self.viewport.to_pixels(*p), size))
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    /// Switch tier, reset the score and deal a new round
    pub fn change_difficulty(&mut self, difficulty: CountingDifficulty) {
        log::info!("counting difficulty -> {}", difficulty.label());
        self.timers.cancel(&mut self.advance_slot);
        self.state.update(|s| {
            s.difficulty = difficulty;
            s.show_settings = false;
            s.scores.reset_score();
        });
        self.start_new_round();
    }
}

impl Timed for CountingEngine {
    type Event = CountingEvent;

    fn timers(&mut self) -> &mut Scheduler<CountingEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: CountingEvent) {
        match event {
            CountingEvent::NextRound(id) if id == self.state.get().round_id => {
                self.start_new_round()
            }
            CountingEvent::NextRound(id) => log::trace!("stale advance for round {id}"),
        }
    }
}

impl MiniGame for CountingEngine {
    fn kind(&self) -> GameKind {
        GameKind::Counting
    }

    fn on_tap(&mut self, pos: Vec2) {
        if let Some(index) = self.hit_test(pos) {
            self.toggle_object(index);
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn toggle_settings(&mut self) {
        CountingEngine::toggle_settings(self);
    }

    fn reset_round(&mut self) {
        CountingEngine::reset_round(self);
    }

    fn advance(&mut self, elapsed: Duration) {
        if !self.paused {
            drive(self, elapsed);
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        self.timers.cancel_all();
    }

    fn resume(&mut self) {
        self.paused = false;
        if self.state.get().phase == RoundPhase::Correct {
            self.start_new_round();
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn engine(difficulty: CountingDifficulty) -> CountingEngine {
        CountingEngine::new(difficulty, 1234)
    }

    #[test]
    fn test_easy_rounds_stay_in_range_with_four_unique_options() {
        let mut game = engine(CountingDifficulty::Easy);
        for _ in 0..100 {
            game.start_new_round();
            let s = game.state();
            assert!((0..=5).contains(&s.object_count));
            assert_eq!(s.options.len(), OPTION_COUNT);
            let unique: BTreeSet<_> = s.options.iter().collect();
            assert_eq!(unique.len(), OPTION_COUNT);
            assert_eq!(s.options.iter().filter(|&&o| o == s.object_count).count(), 1);
            assert_eq!(s.positions.len(), s.object_count as usize);
        }
    }

    #[test]
    fn test_correct_answer_advances_after_delay() {
        let mut game = engine(CountingDifficulty::Medium);
        let first = game.state().round_id;
        let answer = game.state().object_count;

        game.select_answer(answer);
        assert_eq!(game.state().phase, RoundPhase::Correct);
        assert_eq!(game.state().message, Some(messages::CORRECT));
        assert_eq!(game.state().scores.score, 1);

        // Input is locked while the verdict shows
        game.select_answer(answer);
        assert_eq!(game.state().scores.score, 1);

        game.advance(Duration::from_millis(1499));
        assert_eq!(game.state().round_id, first);
        game.advance(Duration::from_millis(1));
        assert_eq!(game.state().round_id, first + 1);
        assert_eq!(game.state().phase, RoundPhase::Active);
        assert_eq!(game.pending_timers(), 0);
    }

    #[test]
    fn test_wrong_answer_keeps_content_until_try_again() {
        let mut game = engine(CountingDifficulty::Hard);
        let before = game.state().clone();
        let wrong = before
            .options
            .iter()
            .copied()
            .find(|&o| o != before.object_count)
            .unwrap();

        game.select_answer(wrong);
        assert_eq!(game.state().phase, RoundPhase::Incorrect);
        game.advance(Duration::from_secs(5));
        assert_eq!(game.state().round_id, before.round_id);

        game.reset_round();
        let after = game.state();
        assert_eq!(after.phase, RoundPhase::Active);
        assert_eq!(after.message, None);
        assert_eq!(after.options, before.options);
        assert_eq!(after.positions, before.positions);
    }

    #[test]
    fn test_paused_round_ignores_answers_and_taps() {
        let mut game = engine(CountingDifficulty::Medium);
        game.pause();
        game.select_answer(game.state().object_count);
        game.toggle_object(0);
        assert_eq!(game.state().phase, RoundPhase::Active);
        assert!(game.state().clicked.is_empty());
        assert_eq!(game.pending_timers(), 0);

        game.resume();
        game.select_answer(game.state().object_count);
        assert_eq!(game.state().phase, RoundPhase::Correct);
    }

    #[test]
    fn test_difficulty_change_cancels_pending_advance_and_resets_score() {
        let mut game = engine(CountingDifficulty::Medium);
        game.select_answer(game.state().object_count);
        assert_eq!(game.pending_timers(), 1);

        game.change_difficulty(CountingDifficulty::Easy);
        assert_eq!(game.pending_timers(), 0);
        assert_eq!(game.state().scores.score, 0);
        assert_eq!(game.state().scores.high_score, 1);
        let round = game.state().round_id;

        game.advance(Duration::from_secs(3));
        assert_eq!(game.state().round_id, round);
    }

    #[test]
    fn test_tap_toggles_first_hit_shape() {
        let mut game = engine(CountingDifficulty::Medium);
        game.resize(Viewport::new(700.0, 700.0));
        // Force a known layout
        game.state.update(|s| {
            s.shape = ShapeKind::Square;
            s.positions = vec![Vec2::new(0.1, 0.1), Vec2::new(0.5, 0.5)];
            s.object_count = 2;
        });

        // Square edge is 100px; (0.15, 0.15) -> (105, 105) lies in the first
        game.on_tap(Vec2::new(0.15, 0.15));
        assert!(game.state().clicked.contains(&0));
        game.on_tap(Vec2::new(0.15, 0.15));
        assert!(game.state().clicked.is_empty());

        // Miss is a no-op
        let version = game.version();
        game.on_tap(Vec2::new(0.95, 0.05));
        assert_eq!(game.version(), version);
    }

    #[test]
    fn test_shape_hit_geometry() {
        let tl = Vec2::new(100.0, 100.0);
        assert!(ShapeKind::Circle.contains(Vec2::new(150.0, 150.0), tl, 100.0));
        assert!(!ShapeKind::Circle.contains(Vec2::new(101.0, 101.0), tl, 100.0));
        assert!(ShapeKind::Rectangle.contains(Vec2::new(150.0, 159.0), tl, 100.0));
        assert!(!ShapeKind::Rectangle.contains(Vec2::new(150.0, 161.0), tl, 100.0));
        assert!(ShapeKind::Triangle.contains(Vec2::new(150.0, 190.0), tl, 100.0));
        assert!(!ShapeKind::Triangle.contains(Vec2::new(105.0, 105.0), tl, 100.0));
    }

    #[test]
    fn test_placement_respects_separation_when_room_allows() {
        let mut rng = Pcg32::seed_from_u64(9);
        let placed = place_shapes(&mut rng, 5, SHAPE_SIZE);
        assert_eq!(placed.len(), 5);
        for (i, a) in placed.iter().enumerate() {
            assert!(a.x >= 0.0 && a.x <= 1.0 - SHAPE_SIZE);
            for b in &placed[i + 1..] {
                assert!(a.distance(*b) >= SHAPE_SIZE * MIN_SEPARATION);
            }
        }
    }

    #[test]
    fn test_placement_overfull_canvas_still_places_all() {
        let mut rng = Pcg32::seed_from_u64(9);
        assert_eq!(place_shapes(&mut rng, 40, SHAPE_SIZE).len(), 40);
    }

    #[test]
    fn test_pause_cancels_advance_and_resume_deals_next_round() {
        let mut game = engine(CountingDifficulty::Easy);
        let round = game.state().round_id;
        game.select_answer(game.state().object_count);

        game.pause();
        assert_eq!(game.pending_timers(), 0);
        game.advance(Duration::from_secs(2));
        assert_eq!(game.state().round_id, round);

        game.resume();
        assert_eq!(game.state().round_id, round + 1);
    }
}
