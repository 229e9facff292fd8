//! Letter tracing
//!
//! One character is shown per round and the child traces it with a finger.
//! The check only counts traced points; any trace of `MIN_POINTS` or more is
//! accepted.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, clamp_axes, drive,
    messages, seeded_rng,
};

pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);
/// Traced points needed for a trace to count
pub const MIN_POINTS: usize = 10;

const LATIN_AND_DIGITS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GREEK_CAPITALS: &str = "ΑΒΓΔΕΖΗΘΙΚΛΜΝΞΟΠΡΣΤΥΦΧΨΩ";

/// Characters a round can ask for
pub fn character_pool(include_greek: bool) -> Vec<char> {
    let mut pool: Vec<char> = LATIN_AND_DIGITS.chars().collect();
    if include_greek {
        pool.extend(GREEK_CAPITALS.chars());
    }
    pool
}

pub fn pick_character<R: Rng>(rng: &mut R, include_greek: bool) -> char {
    let pool = character_pool(include_greek);
    pool[rng.random_range(0..pool.len())]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LettersState {
    pub round_id: RoundId,
    pub character: char,
    /// Traced strokes, each a run of normalized points
    pub strokes: Vec<Vec<Vec2>>,
    pub phase: RoundPhase,
    pub message: Option<&'static str>,
    pub include_greek: bool,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

impl LettersState {
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone)]
pub enum LettersEvent {
    NextRound(RoundId),
}

pub struct LettersEngine {
    state: Published<LettersState>,
    rng: GameRng,
    timers: Scheduler<LettersEvent>,
    advance_slot: TimerSlot,
    paused: bool,
}

impl LettersEngine {
    pub fn new(include_greek: bool, seed: u64) -> Self {
        let mut rng = seeded_rng(seed, GameKind::Letters.stream());
        let character = pick_character(&mut rng, include_greek);
        Self {
            state: Published::new(LettersState {
                round_id: 1,
                character,
                strokes: Vec::new(),
                phase: RoundPhase::Active,
                message: None,
                include_greek,
                show_settings: false,
                scores: ScoreBoard::new(),
            }),
            rng,
            timers: Scheduler::new(),
            advance_slot: TimerSlot::new(),
            paused: false,
        }
    }

    pub fn state(&self) -> &LettersState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<LettersState> {
        self.state.snapshot()
    }

    pub fn start_new_round(&mut self) {
        self.timers.cancel(&mut self.advance_slot);
        let character = pick_character(&mut self.rng, self.state.get().include_greek);
        self.state.update(|s| {
            s.round_id += 1;
            s.character = character;
            s.strokes.clear();
            s.phase = RoundPhase::Active;
            s.message = None;
        });
        log::debug!("letters round {}: {character}", self.state.get().round_id);
    }

    /// Begin a new stroke at `pos`
    pub fn begin_stroke(&mut self, pos: Vec2) {
        if self.paused || !self.state.get().phase.accepts_input() {
            return;
        }
        let pos = clamp_axes(pos, 0.0, 1.0);
        self.state.update(|s| s.strokes.push(vec![pos]));
    }

    /// Extend the current stroke, starting one if needed
    pub fn add_point(&mut self, pos: Vec2) {
        if self.paused || !self.state.get().phase.accepts_input() {
            return;
        }
        let pos = clamp_axes(pos, 0.0, 1.0);
        self.state.update(|s| match s.strokes.last_mut() {
            Some(stroke) => stroke.push(pos),
            None => s.strokes.push(vec![pos]),
        });
    }

    pub fn clear_drawing(&mut self) {
        if self.paused || !self.state.get().phase.accepts_input() {
            return;
        }
        self.state.update(|s| s.strokes.clear());
    }

    pub fn check_drawing(&mut self) {
        let current = self.state.get();
        if self.paused || !current.phase.accepts_input() {
            return;
        }
        let correct = current.point_count() >= MIN_POINTS;
        let round_id = current.round_id;

        self.state.update(|s| {
            if correct {
                s.phase = RoundPhase::Correct;
                s.message = Some(messages::CORRECT);
                s.scores.record_point();
            } else {
                s.phase = RoundPhase::Incorrect;
                s.message = Some(messages::TRY_AGAIN);
            }
        });
        log::debug!("letters round {round_id} checked: {correct}");

        if correct {
            self.timers.arm_once(
                &mut self.advance_slot,
                ADVANCE_DELAY,
                LettersEvent::NextRound(round_id),
            );
        }
    }

    /// "Try again": same character, empty trace
    pub fn reset_round(&mut self) {
        if self.state.get().phase != RoundPhase::Incorrect {
            return;
        }
        self.state.update(|s| {
            s.phase = RoundPhase::Active;
            s.message = None;
            s.strokes.clear();
        });
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    pub fn set_include_greek(&mut self, include_greek: bool) {
        log::info!("letters greek alphabet -> {include_greek}");
        self.timers.cancel(&mut self.advance_slot);
        self.state.update(|s| {
            s.include_greek = include_greek;
            s.show_settings = false;
            s.scores.reset_score();
        });
        self.start_new_round();
    }
}

impl Timed for LettersEngine {
    type Event = LettersEvent;

    fn timers(&mut self) -> &mut Scheduler<LettersEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: LettersEvent) {
        match event {
            LettersEvent::NextRound(id) if id == self.state.get().round_id => {
                self.start_new_round()
            }
            LettersEvent::NextRound(id) => log::trace!("stale advance for round {id}"),
        }
    }
}

impl MiniGame for LettersEngine {
    fn kind(&self) -> GameKind {
        GameKind::Letters
    }

    fn on_drag_start(&mut self, pos: Vec2) {
        self.begin_stroke(pos);
    }

    fn on_drag_move(&mut self, pos: Vec2) {
        self.add_point(pos);
    }

    fn toggle_settings(&mut self) {
        LettersEngine::toggle_settings(self);
    }

    fn reset_round(&mut self) {
        LettersEngine::reset_round(self);
    }

    fn advance(&mut self, elapsed: Duration) {
        if !self.paused {
            drive(self, elapsed);
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        self.timers.cancel(&mut self.advance_slot);
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
