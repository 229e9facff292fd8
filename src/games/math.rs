//! Math quiz
//!
//! Addition and subtraction within a chosen range. Every answer, right or
//! wrong, scores (or not) and deals the next problem after a short pause.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameKind, Mascot, MiniGame};
use crate::error::ConfigError;
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, drive, seeded_rng,
    unique_options,
};

/// Pause between an answer and the next problem
pub const REFRESH_DELAY: Duration = Duration::from_millis(300);
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 5;
pub const DEFAULT_OPTIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MathOperation {
    Add,
    Subtract,
}

impl MathOperation {
    pub const ALL: [MathOperation; 2] = [MathOperation::Add, MathOperation::Subtract];

    pub fn symbol(self) -> &'static str {
        match self {
            MathOperation::Add => "+",
            MathOperation::Subtract => "−",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MathRange {
    #[default]
    Small,
    Medium,
    Large,
}

impl MathRange {
    pub const ALL: [MathRange; 3] = [MathRange::Small, MathRange::Medium, MathRange::Large];

    /// Inclusive operand range
    pub fn bounds(self) -> (i32, i32) {
        match self {
            MathRange::Small => (0, 10),
            MathRange::Medium => (0, 20),
            MathRange::Large => (0, 50),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MathRange::Small => "0-10",
            MathRange::Medium => "0-20",
            MathRange::Large => "0-50",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProblem {
    pub left: i32,
    pub right: i32,
    pub operation: MathOperation,
}

impl MathProblem {
    pub fn new(left: i32, right: i32, operation: MathOperation) -> Self {
        Self {
            left,
            right,
            operation,
        }
    }

    pub fn answer(&self) -> i32 {
        match self.operation {
            MathOperation::Add => self.left + self.right,
            MathOperation::Subtract => self.left - self.right,
        }
    }

    /// Largest value an answer option may take for this problem
    pub fn max_option(&self, range: (i32, i32)) -> i32 {
        match self.operation {
            MathOperation::Add => range.1 + range.1,
            MathOperation::Subtract => range.1,
        }
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = ?",
            self.left,
            self.operation.symbol(),
            self.right
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MathOption {
    pub value: i32,
    pub is_correct: bool,
}

/// Uniform pick among the allowed operations (all of them if none allowed)
pub fn pick_operation<R: Rng>(rng: &mut R, allowed: &BTreeSet<MathOperation>) -> MathOperation {
    let pool: Vec<MathOperation> = if allowed.is_empty() {
        MathOperation::ALL.to_vec()
    } else {
        allowed.iter().copied().collect()
    };
    pool[rng.random_range(0..pool.len())]
}

/// Random problem; subtraction operands are ordered so the answer is never negative
pub fn generate_problem<R: Rng>(
    rng: &mut R,
    range: (i32, i32),
    allowed: &BTreeSet<MathOperation>,
) -> MathProblem {
    let operation = pick_operation(rng, allowed);
    let left = rng.random_range(range.0..=range.1);
    let right = rng.random_range(range.0..=range.1);
    if operation == MathOperation::Subtract && right > left {
        MathProblem::new(right, left, operation)
    } else {
        MathProblem::new(left, right, operation)
    }
}

/// `count` distinct options in `[0, max_option]`, exactly one of them the answer
pub fn build_options<R: Rng>(
    rng: &mut R,
    problem: &MathProblem,
    count: usize,
    range: (i32, i32),
) -> Result<Vec<MathOption>, ConfigError> {
    let answer = problem.answer();
    let values = unique_options(
        rng,
        answer,
        count.max(MIN_OPTIONS),
        0,
        problem.max_option(range),
    )?;
    Ok(values
        .into_iter()
        .map(|value| MathOption {
            value,
            is_correct: value == answer,
        })
        .collect())
}

pub fn check_option_count(count: usize) -> Result<(), ConfigError> {
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&count) {
        return Err(ConfigError::InvalidOptionCount {
            count,
            min: MIN_OPTIONS,
            max: MAX_OPTIONS,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathState {
    pub round_id: RoundId,
    pub problem: MathProblem,
    pub options: Vec<MathOption>,
    pub range: MathRange,
    pub operations: BTreeSet<MathOperation>,
    pub option_count: usize,
    pub phase: RoundPhase,
    /// Answer given, next problem pending
    pub is_refreshing: bool,
    pub last_result_correct: Option<bool>,
    pub mascot: Mascot,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

impl MathState {
    pub fn is_game_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }
}

#[derive(Debug, Clone)]
pub enum MathEvent {
    Refresh(RoundId),
}

pub struct MathEngine {
    state: Published<MathState>,
    rng: GameRng,
    timers: Scheduler<MathEvent>,
    refresh_slot: TimerSlot,
}

impl MathEngine {
    pub fn new(
        range: MathRange,
        operations: BTreeSet<MathOperation>,
        option_count: usize,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        check_option_count(option_count)?;
        if operations.is_empty() {
            return Err(ConfigError::NoOperations);
        }
        let mut rng = seeded_rng(seed, GameKind::Math.stream());
        let problem = generate_problem(&mut rng, range.bounds(), &operations);
        let options = build_options(&mut rng, &problem, option_count, range.bounds())?;
        let mascot = Mascot::random(&mut rng);

        Ok(Self {
            state: Published::new(MathState {
                round_id: 1,
                problem,
                options,
                range,
                operations,
                option_count,
                phase: RoundPhase::NotStarted,
                is_refreshing: false,
                last_result_correct: None,
                mascot,
                show_settings: false,
                scores: ScoreBoard::new(),
            }),
            rng,
            timers: Scheduler::new(),
            refresh_slot: TimerSlot::new(),
        })
    }

    pub fn state(&self) -> &MathState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<MathState> {
        self.state.snapshot()
    }

    /// Fresh problem and options for the current settings
    fn deal(&mut self, s: &mut MathState) {
        let bounds = s.range.bounds();
        s.problem = generate_problem(&mut self.rng, bounds, &s.operations);
        s.options = build_options(&mut self.rng, &s.problem, s.option_count, bounds)
            .unwrap_or_else(|err| {
                log::error!("math options: {err}");
                vec![MathOption {
                    value: s.problem.answer(),
                    is_correct: true,
                }]
            });
        s.round_id += 1;
        s.mascot = Mascot::random(&mut self.rng);
    }

    /// New problem, score zeroed, high score kept; leaves the game inactive
    fn reset_game_state(&mut self) {
        let mut next = self.state.get().clone();
        self.deal(&mut next);
        next.scores.reset_score();
        next.last_result_correct = None;
        next.is_refreshing = false;
        next.phase = RoundPhase::NotStarted;
        self.state.replace(next);
    }

    pub fn start_game(&mut self) {
        self.stop_game();
        self.reset_game_state();
        self.state.update(|s| s.phase = RoundPhase::Active);
        log::debug!("math game started: {}", self.state.get().problem);
    }

    /// Same as starting over
    pub fn play_again(&mut self) {
        self.start_game();
    }

    pub fn stop_game(&mut self) {
        self.timers.cancel(&mut self.refresh_slot);
        self.state.update(|s| {
            s.phase = RoundPhase::NotStarted;
            s.is_refreshing = false;
        });
    }

    pub fn select_option(&mut self, value: i32) {
        let current = self.state.get();
        if !current.is_game_active() || current.is_refreshing {
            return;
        }
        let Some(option) = current.options.iter().find(|o| o.value == value).copied() else {
            return;
        };
        let round_id = current.round_id;

        self.state.update(|s| {
            if option.is_correct {
                s.scores.record_point();
            }
            s.last_result_correct = Some(option.is_correct);
            s.is_refreshing = true;
        });
        self.timers.arm_once(
            &mut self.refresh_slot,
            REFRESH_DELAY,
            MathEvent::Refresh(round_id),
        );
    }

    fn refresh_round(&mut self) {
        let mut next = self.state.get().clone();
        self.deal(&mut next);
        next.is_refreshing = false;
        self.state.replace(next);
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    fn apply_setting<F: FnOnce(&mut MathState)>(&mut self, edit: F) {
        self.stop_game();
        self.state.update(|s| {
            edit(s);
            s.show_settings = false;
        });
        self.reset_game_state();
    }

    pub fn change_option_count(&mut self, count: usize) -> Result<(), ConfigError> {
        check_option_count(count)?;
        log::info!("math option count -> {count}");
        self.apply_setting(|s| s.option_count = count);
        Ok(())
    }

    pub fn change_range(&mut self, range: MathRange) {
        log::info!("math range -> {}", range.label());
        self.apply_setting(|s| s.range = range);
    }

    /// Enable or disable an operation; the last enabled one stays on
    pub fn toggle_operation(&mut self, operation: MathOperation) {
        let current = &self.state.get().operations;
        if current.len() == 1 && current.contains(&operation) {
            return;
        }
        self.apply_setting(|s| {
            if !s.operations.remove(&operation) {
                s.operations.insert(operation);
            }
        });
    }
}

impl Timed for MathEngine {
    type Event = MathEvent;

    fn timers(&mut self) -> &mut Scheduler<MathEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: MathEvent) {
        match event {
            MathEvent::Refresh(id) if id == self.state.get().round_id => self.refresh_round(),
            MathEvent::Refresh(id) => log::trace!("stale refresh for problem {id}"),
        }
    }
}

impl MiniGame for MathEngine {
    fn kind(&self) -> GameKind {
        GameKind::Math
    }

    fn toggle_settings(&mut self) {
        MathEngine::toggle_settings(self);
    }

    fn advance(&mut self, elapsed: Duration) {
        drive(self, elapsed);
    }

    fn pause(&mut self) {
        self.timers.cancel(&mut self.refresh_slot);
        if self.state.get().phase == RoundPhase::Active {
            self.state.update(|s| s.phase = RoundPhase::Paused);
        }
    }

    fn resume(&mut self) {
        if self.state.get().phase != RoundPhase::Paused {
            return;
        }
        self.state.update(|s| s.phase = RoundPhase::Active);
        if self.state.get().is_refreshing {
            self.refresh_round();
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
