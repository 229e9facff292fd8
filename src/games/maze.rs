//! Maze game
//!
//! A perfect maze is carved with a randomized depth-first search on an
//! odd-sized grid. The child drags a path from the start cell; points that
//! land on a wall are dropped, and reaching the end cell's center wins.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, drive, messages,
    seeded_rng,
};

pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);
/// Normalized distance to the end cell's center that counts as arrival
pub const WIN_DISTANCE: f32 = 0.05;

/// Carve directions: up, right, down, left, two cells at a time
const DIRECTIONS: [(isize, isize); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MazeDifficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    SuperHard,
}

impl MazeDifficulty {
    pub const ALL: [MazeDifficulty; 4] = [
        MazeDifficulty::Easy,
        MazeDifficulty::Medium,
        MazeDifficulty::Hard,
        MazeDifficulty::SuperHard,
    ];

    /// Grid edge, always odd
    pub fn grid_size(self) -> usize {
        match self {
            MazeDifficulty::Easy => 11,
            MazeDifficulty::Medium => 15,
            MazeDifficulty::Hard => 19,
            MazeDifficulty::SuperHard => 23,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MazeDifficulty::Easy => "Easy",
            MazeDifficulty::Medium => "Medium",
            MazeDifficulty::Hard => "Hard",
            MazeDifficulty::SuperHard => "Super Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Path,
}

/// Square grid of cells, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Maze {
    size: usize,
    cells: Vec<Cell>,
    pub start: (usize, usize),
    pub end: (usize, usize),
}

impl Maze {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.size && y < self.size {
            Some(self.cells[y * self.size + x])
        } else {
            None
        }
    }

    pub fn is_path(&self, x: usize, y: usize) -> bool {
        self.cell(x, y) == Some(Cell::Path)
    }

    pub fn path_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Path).count()
    }

    /// Grid cell under a normalized position; `None` off the grid
    pub fn cell_at(&self, pos: Vec2) -> Option<(usize, usize)> {
        let grid = pos * self.size as f32;
        if grid.x < 0.0 || grid.y < 0.0 {
            return None;
        }
        let (x, y) = (grid.x.floor() as usize, grid.y.floor() as usize);
        (x < self.size && y < self.size).then_some((x, y))
    }

    /// Normalized center of a cell
    pub fn cell_center(&self, (x, y): (usize, usize)) -> Vec2 {
        (Vec2::new(x as f32, y as f32) + 0.5) / self.size as f32
    }

    /// Whether a normalized position is on a path cell
    pub fn is_walkable(&self, pos: Vec2) -> bool {
        self.cell_at(pos).is_some_and(|(x, y)| self.is_path(x, y))
    }

    /// Orthogonal path neighbours of a cell
    pub fn neighbours(&self, (x, y): (usize, usize)) -> impl Iterator<Item = (usize, usize)> + '_ {
        [(0isize, -1isize), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dy)| {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                self.is_path(nx, ny).then_some((nx, ny))
            })
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.cells[y * self.size + x] = cell;
    }
}

/// Carve a perfect maze on a `size` x `size` grid.
///
/// Even sizes are bumped to the next odd one and anything below 5 to 5, so
/// there is always room for a start and an end cell.
pub fn generate_maze<R: Rng>(rng: &mut R, size: usize) -> Maze {
    let size = size.max(5) | 1;
    let mut maze = Maze {
        size,
        cells: vec![Cell::Wall; size * size],
        start: (1, 1),
        end: (1, 1),
    };

    let mut stack = vec![(1usize, 1usize)];
    maze.set(1, 1, Cell::Path);

    while let Some(&(x, y)) = stack.last() {
        let candidates: Vec<(usize, usize)> = DIRECTIONS
            .iter()
            .filter_map(|&(dx, dy)| {
                let nx = x.checked_add_signed(dx)?;
                let ny = y.checked_add_signed(dy)?;
                let interior = nx > 0 && nx < size - 1 && ny > 0 && ny < size - 1;
                (interior && maze.cell(nx, ny) == Some(Cell::Wall)).then_some((nx, ny))
            })
            .collect();

        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let (nx, ny) = candidates[rng.random_range(0..candidates.len())];
        maze.set((x + nx) / 2, (y + ny) / 2, Cell::Path);
        maze.set(nx, ny, Cell::Path);
        stack.push((nx, ny));
    }

    maze.start = find_start(&maze);
    maze.end = find_end(&maze);
    maze
}

/// First path cell scanning from the top-left corner
fn find_start(maze: &Maze) -> (usize, usize) {
    (0..maze.size)
        .flat_map(|y| (0..maze.size).map(move |x| (x, y)))
        .find(|&(x, y)| maze.is_path(x, y))
        .unwrap_or((1, 1))
}

/// First path cell scanning back from the bottom-right, one cell in from the edge
fn find_end(maze: &Maze) -> (usize, usize) {
    let last = maze.size - 2;
    (1..=last)
        .rev()
        .flat_map(|y| (1..=last).rev().map(move |x| (x, y)))
        .find(|&(x, y)| maze.is_path(x, y))
        .unwrap_or(maze.start)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MazeState {
    pub round_id: RoundId,
    pub maze: Arc<Maze>,
    /// Accepted drag points, normalized, one list per stroke
    pub path: Vec<Vec<Vec2>>,
    pub phase: RoundPhase,
    pub message: Option<&'static str>,
    pub difficulty: MazeDifficulty,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

impl MazeState {
    pub fn is_solved(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    pub fn point_count(&self) -> usize {
        self.path.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone)]
pub enum MazeEvent {
    NextMaze(RoundId),
}

pub struct MazeEngine {
    state: Published<MazeState>,
    rng: GameRng,
    timers: Scheduler<MazeEvent>,
    advance_slot: TimerSlot,
    paused: bool,
}

impl MazeEngine {
    pub fn new(difficulty: MazeDifficulty, seed: u64) -> Self {
        let mut rng = seeded_rng(seed, GameKind::Maze.stream());
        let maze = generate_maze(&mut rng, difficulty.grid_size());
        Self {
            state: Published::new(MazeState {
                round_id: 1,
                maze: Arc::new(maze),
                path: Vec::new(),
                phase: RoundPhase::Active,
                message: None,
                difficulty,
                show_settings: false,
                scores: ScoreBoard::new(),
            }),
            rng,
            timers: Scheduler::new(),
            advance_slot: TimerSlot::new(),
            paused: false,
        }
    }

    pub fn state(&self) -> &MazeState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<MazeState> {
        self.state.snapshot()
    }

    pub fn new_maze(&mut self) {
        self.timers.cancel(&mut self.advance_slot);
        let maze = generate_maze(&mut self.rng, self.state.get().difficulty.grid_size());
        log::debug!(
            "maze {}x{}: start {:?} end {:?}",
            maze.size,
            maze.size,
            maze.start,
            maze.end
        );
        self.state.update(|s| {
            s.round_id += 1;
            s.maze = Arc::new(maze);
            s.path.clear();
            s.phase = RoundPhase::Active;
            s.message = None;
        });
    }

    /// Start a new stroke at `pos` unless it lands on a wall or off the grid.
    /// Returns whether the point was accepted.
    pub fn begin_stroke(&mut self, pos: Vec2) -> bool {
        self.trace(pos, true)
    }

    /// Extend the current stroke, starting one if needed. Returns whether
    /// the point was accepted.
    pub fn add_point(&mut self, pos: Vec2) -> bool {
        self.trace(pos, false)
    }

    fn trace(&mut self, pos: Vec2, new_stroke: bool) -> bool {
        let current = self.state.get();
        if self.paused || !current.phase.accepts_input() || !current.maze.is_walkable(pos) {
            return false;
        }
        let target = current.maze.cell_center(current.maze.end);
        let solved = pos.distance(target) < WIN_DISTANCE;
        let round_id = current.round_id;

        self.state.update(|s| {
            if new_stroke || s.path.is_empty() {
                s.path.push(vec![pos]);
            } else if let Some(stroke) = s.path.last_mut() {
                stroke.push(pos);
            }
            if solved {
                s.phase = RoundPhase::Complete;
                s.message = Some(messages::MAZE_SOLVED);
                s.scores.record_point();
            }
        });

        if solved {
            log::debug!("maze {round_id} solved");
            self.timers.arm_once(
                &mut self.advance_slot,
                ADVANCE_DELAY,
                MazeEvent::NextMaze(round_id),
            );
        }
        true
    }

    pub fn clear_drawing(&mut self) {
        if self.paused || !self.state.get().phase.accepts_input() {
            return;
        }
        self.state.update(|s| s.path.clear());
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    pub fn change_difficulty(&mut self, difficulty: MazeDifficulty) {
        log::info!("maze difficulty -> {}", difficulty.label());
        self.timers.cancel(&mut self.advance_slot);
        self.state.update(|s| {
            s.difficulty = difficulty;
            s.show_settings = false;
            s.scores.reset_score();
        });
        self.new_maze();
    }
}

impl Timed for MazeEngine {
    type Event = MazeEvent;

    fn timers(&mut self) -> &mut Scheduler<MazeEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: MazeEvent) {
        match event {
            MazeEvent::NextMaze(id) if id == self.state.get().round_id => self.new_maze(),
            MazeEvent::NextMaze(id) => log::trace!("stale advance for maze {id}"),
        }
    }
}

impl MiniGame for MazeEngine {
    fn kind(&self) -> GameKind {
        GameKind::Maze
    }

    fn on_drag_start(&mut self, pos: Vec2) {
        self.begin_stroke(pos);
    }

    fn on_drag_move(&mut self, pos: Vec2) {
        self.add_point(pos);
    }

    fn toggle_settings(&mut self) {
        MazeEngine::toggle_settings(self);
    }

    fn reset_round(&mut self) {
        self.clear_drawing();
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
        if self.state.get().is_solved() {
            self.new_maze();
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

    #[test]
    fn test_eleven_grid_start_and_end() {
        let mut rng = Pcg32::seed_from_u64(3);
        let maze = generate_maze(&mut rng, 11);
        assert_eq!(maze.size(), 11);
        assert_eq!(maze.start, (1, 1));
        assert_eq!(maze.end, (9, 9));
        assert!(maze.is_path(1, 1));
        assert!(maze.is_path(9, 9));
    }

    #[test]
    fn test_border_is_solid_wall() {
        let mut rng = Pcg32::seed_from_u64(5);
        let maze = generate_maze(&mut rng, 15);
        for i in 0..15 {
            assert_eq!(maze.cell(i, 0), Some(Cell::Wall));
            assert_eq!(maze.cell(i, 14), Some(Cell::Wall));
            assert_eq!(maze.cell(0, i), Some(Cell::Wall));
            assert_eq!(maze.cell(14, i), Some(Cell::Wall));
        }
    }

    #[test]
    fn test_even_size_is_made_odd() {
        let mut rng = Pcg32::seed_from_u64(5);
        assert_eq!(generate_maze(&mut rng, 12).size(), 13);
        assert_eq!(generate_maze(&mut rng, 0).size(), 5);
    }

    #[test]
    fn test_wall_points_are_rejected() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        // (0, 0) is always wall
        assert!(!game.add_point(Vec2::new(0.01, 0.01)));
        assert!(!game.add_point(Vec2::new(1.5, 0.5)));
        assert!(game.state().path.is_empty());

        let start = game.state().maze.cell_center((1, 1));
        assert!(game.add_point(start));
        assert_eq!(game.state().path, vec![vec![start]]);
    }

    #[test]
    fn test_separate_drags_keep_separate_strokes() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        let maze = game.state().maze.clone();
        let start = maze.cell_center(maze.start);
        let next = maze
            .neighbours(maze.start)
            .next()
            .map(|cell| maze.cell_center(cell))
            .unwrap();

        game.on_drag_start(start);
        game.on_drag_move(next);
        game.on_drag_end(next);
        game.on_drag_start(next);
        game.on_drag_move(start);

        assert_eq!(game.state().path, vec![vec![start, next], vec![next, start]]);
        assert_eq!(game.state().point_count(), 4);
    }

    #[test]
    fn test_wall_drag_start_does_not_open_stroke() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        let start = game.state().maze.cell_center((1, 1));
        game.on_drag_start(start);
        assert!(!game.begin_stroke(Vec2::new(0.01, 0.01)));
        assert!(game.add_point(start));
        assert_eq!(game.state().path.len(), 1);
        assert_eq!(game.state().point_count(), 2);
    }

    #[test]
    fn test_paused_maze_ignores_trace() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        let maze = game.state().maze.clone();
        game.pause();
        assert!(!game.add_point(maze.cell_center(maze.end)));
        assert!(!game.state().is_solved());
        assert!(game.state().path.is_empty());
        assert_eq!(game.pending_timers(), 0);

        game.resume();
        assert!(game.add_point(maze.cell_center(maze.end)));
        assert!(game.state().is_solved());
    }

    #[test]
    fn test_reaching_end_solves_and_deals_next_maze() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        let maze = game.state().maze.clone();
        let round = game.state().round_id;

        assert!(game.add_point(maze.cell_center(maze.end)));
        assert!(game.state().is_solved());
        assert_eq!(game.state().message, Some(messages::MAZE_SOLVED));
        assert_eq!(game.state().scores.score, 1);

        // solved mazes ignore further input
        assert!(!game.add_point(maze.cell_center(maze.start)));

        game.advance(ADVANCE_DELAY);
        assert_eq!(game.state().round_id, round + 1);
        assert!(game.state().path.is_empty());
        assert_eq!(game.state().phase, RoundPhase::Active);
    }

    #[test]
    fn test_difficulty_change_resizes_and_resets_score() {
        let mut game = MazeEngine::new(MazeDifficulty::Easy, 11);
        let maze = game.state().maze.clone();
        game.add_point(maze.cell_center(maze.end));

        game.change_difficulty(MazeDifficulty::SuperHard);
        assert_eq!(game.state().maze.size(), 23);
        assert_eq!(game.state().scores.score, 0);
        assert_eq!(game.state().scores.high_score, 1);
        assert_eq!(game.pending_timers(), 0);
    }
}
