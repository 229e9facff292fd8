//! Jigsaw puzzle
//!
//! A square picture is cut into a grid of pieces that start in a tray next
//! to (or under) the board. Dropping a piece on its own cell snaps it in
//! place for good; the level is done when every piece is placed.
//!
//! While a piece is being dragged its position lives only in the engine's
//! drag preview. The published state sees the piece again at drag end.

pub mod layout;

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{
    GameRng, Published, RoundId, RoundPhase, Scheduler, Timed, TimerSlot, Viewport, clamp_axes,
    drive, messages, seeded_rng,
};

pub use layout::{EDGE_MARGIN, PuzzleLayout, TrayKind, scatter_bottom};

/// Pause between a finished puzzle and the next level
pub const ADVANCE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JigsawDifficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl JigsawDifficulty {
    pub const ALL: [JigsawDifficulty; 3] = [
        JigsawDifficulty::Easy,
        JigsawDifficulty::Medium,
        JigsawDifficulty::Hard,
    ];

    /// Pieces per side
    pub fn grid_size(self) -> usize {
        match self {
            JigsawDifficulty::Easy => 2,
            JigsawDifficulty::Medium => 3,
            JigsawDifficulty::Hard => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JigsawDifficulty::Easy => "Easy (2x2)",
            JigsawDifficulty::Medium => "Medium (3x3)",
            JigsawDifficulty::Hard => "Hard (4x4)",
        }
    }
}

/// Logical picture id; the host maps it to an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PuzzleImage(pub &'static str);

pub const PUZZLE_IMAGES: [PuzzleImage; 23] = [
    PuzzleImage("crane"),
    PuzzleImage("hippo"),
    PuzzleImage("photo001"),
    PuzzleImage("photo002"),
    PuzzleImage("photo003"),
    PuzzleImage("photo004"),
    PuzzleImage("photo005"),
    PuzzleImage("photo006"),
    PuzzleImage("photo007"),
    PuzzleImage("photo008"),
    PuzzleImage("photo009"),
    PuzzleImage("photo010"),
    PuzzleImage("photo011"),
    PuzzleImage("photo012"),
    PuzzleImage("photo013"),
    PuzzleImage("photo014"),
    PuzzleImage("photo015"),
    PuzzleImage("photo016"),
    PuzzleImage("photo017"),
    PuzzleImage("photo018"),
    PuzzleImage("photo019"),
    PuzzleImage("squirrel"),
    PuzzleImage("whale"),
];

/// Shuffled deck of pictures so every one comes up before any repeats
#[derive(Debug, Default)]
pub struct ImageDeck {
    remaining: Vec<PuzzleImage>,
}

impl ImageDeck {
    pub fn draw<R: Rng>(&mut self, rng: &mut R, last: Option<PuzzleImage>) -> PuzzleImage {
        if self.remaining.is_empty() {
            self.remaining = PUZZLE_IMAGES.to_vec();
            self.remaining.shuffle(rng);
            // no back-to-back repeat across a refill
            let top = self.remaining.len() - 1;
            if top > 0 && last == Some(self.remaining[top]) {
                self.remaining.swap(0, top);
            }
        }
        self.remaining.pop().unwrap_or(PUZZLE_IMAGES[0])
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Piece {
    /// Cell `(col, row)` this piece belongs in
    pub correct: (usize, usize),
    /// Normalized center
    pub position: Vec2,
    pub is_placed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JigsawState {
    pub round_id: RoundId,
    pub image: PuzzleImage,
    pub level: u32,
    pub pieces: Vec<Piece>,
    pub layout: PuzzleLayout,
    pub phase: RoundPhase,
    pub message: Option<&'static str>,
    pub difficulty: JigsawDifficulty,
    pub show_settings: bool,
    pub scores: ScoreBoard,
}

impl JigsawState {
    pub fn is_complete(&self) -> bool {
        self.phase == RoundPhase::Complete
    }

    pub fn placed_count(&self) -> usize {
        self.pieces.iter().filter(|p| p.is_placed).count()
    }
}

/// Piece being dragged, outside the published state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub piece: usize,
    pub position: Vec2,
    last_pointer: Vec2,
}

#[derive(Debug, Clone)]
pub enum JigsawEvent {
    NextLevel(RoundId),
}

/// Tray positions for the given pieces under the layout's tray kind
fn tray_positions<R: Rng>(
    rng: &mut R,
    layout: &PuzzleLayout,
    viewport: Viewport,
    count: usize,
) -> Vec<Vec2> {
    match layout.tray {
        TrayKind::Side => layout.side_tray_slots(viewport, count),
        TrayKind::Bottom => (0..count).map(|_| scatter_bottom(rng)).collect(),
    }
}

/// One piece per cell, in shuffled order, all in the tray
pub fn deal_pieces<R: Rng>(rng: &mut R, layout: &PuzzleLayout, viewport: Viewport) -> Vec<Piece> {
    let grid = layout.grid;
    let mut cells: Vec<(usize, usize)> = (0..grid)
        .flat_map(|row| (0..grid).map(move |col| (col, row)))
        .collect();
    cells.shuffle(rng);
    let positions = tray_positions(rng, layout, viewport, cells.len());
    cells
        .into_iter()
        .zip(positions)
        .map(|(correct, position)| Piece {
            correct,
            position,
            is_placed: false,
        })
        .collect()
}

pub struct JigsawEngine {
    state: Published<JigsawState>,
    rng: GameRng,
    deck: ImageDeck,
    timers: Scheduler<JigsawEvent>,
    advance_slot: TimerSlot,
    viewport: Viewport,
    drag: Option<DragPreview>,
    paused: bool,
}

impl JigsawEngine {
    pub fn new(difficulty: JigsawDifficulty, seed: u64) -> Self {
        let mut rng = seeded_rng(seed, GameKind::Jigsaw.stream());
        let mut deck = ImageDeck::default();
        let viewport = Viewport::default();
        let layout = PuzzleLayout::calculate(viewport, difficulty.grid_size());
        let image = deck.draw(&mut rng, None);
        let pieces = deal_pieces(&mut rng, &layout, viewport);

        Self {
            state: Published::new(JigsawState {
                round_id: 1,
                image,
                level: 1,
                pieces,
                layout,
                phase: RoundPhase::Active,
                message: None,
                difficulty,
                show_settings: false,
                scores: ScoreBoard::new(),
            }),
            rng,
            deck,
            timers: Scheduler::new(),
            advance_slot: TimerSlot::new(),
            viewport,
            drag: None,
            paused: false,
        }
    }

    pub fn state(&self) -> &JigsawState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<JigsawState> {
        self.state.snapshot()
    }

    pub fn drag_preview(&self) -> Option<DragPreview> {
        self.drag
    }

    /// Normalized center of a board cell under the current layout
    pub fn cell_center(&self, cell: (usize, usize)) -> Vec2 {
        self.viewport
            .to_normalized(self.state.get().layout.cell_center(cell))
    }

    /// Deal a fresh picture at the current difficulty
    fn new_puzzle(&mut self, level: u32) {
        self.timers.cancel(&mut self.advance_slot);
        self.drag = None;
        let current = self.state.get();
        let layout = PuzzleLayout::calculate(self.viewport, current.difficulty.grid_size());
        let image = self.deck.draw(&mut self.rng, Some(current.image));
        let pieces = deal_pieces(&mut self.rng, &layout, self.viewport);
        log::debug!("jigsaw level {level}: {} ({} pieces)", image.0, pieces.len());

        self.state.update(|s| {
            s.round_id += 1;
            s.level = level;
            s.image = image;
            s.pieces = pieces;
            s.layout = layout;
            s.phase = RoundPhase::Active;
            s.message = None;
        });
    }

    pub fn next_level(&mut self) {
        let level = self.state.get().level + 1;
        self.new_puzzle(level);
    }

    /// Topmost loose piece under a normalized position
    pub fn piece_at(&self, pos: Vec2) -> Option<usize> {
        let current = self.state.get();
        let half = current.layout.cell_size() / 2.0;
        let pointer = self.viewport.to_pixels(pos);
        current
            .pieces
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, p)| !p.is_placed)
            .find(|(_, p)| {
                let d = (self.viewport.to_pixels(p.position) - pointer).abs();
                d.x <= half && d.y <= half
            })
            .map(|(i, _)| i)
    }

    /// Commit a piece's dropped position and snap it if it is on its own,
    /// unoccupied cell. Returns whether the piece was placed.
    pub fn end_drag(&mut self, index: usize, position: Vec2) -> bool {
        let current = self.state.get();
        if self.paused || !current.phase.accepts_input() {
            return false;
        }
        let Some(piece) = current.pieces.get(index) else {
            return false;
        };
        if piece.is_placed {
            return false;
        }

        let position = clamp_axes(position, EDGE_MARGIN, 1.0 - EDGE_MARGIN);
        let target = current
            .layout
            .cell_at(self.viewport.to_pixels(position))
            .filter(|cell| *cell == piece.correct)
            .filter(|cell| {
                !current
                    .pieces
                    .iter()
                    .enumerate()
                    .any(|(i, p)| i != index && p.is_placed && p.correct == *cell)
            });
        let snapped = target.map(|cell| self.cell_center(cell));
        let complete = snapped.is_some() && current.placed_count() + 1 == current.pieces.len();
        let round_id = current.round_id;

        self.state.update(|s| {
            let piece = &mut s.pieces[index];
            match snapped {
                Some(center) => {
                    piece.position = center;
                    piece.is_placed = true;
                }
                None => piece.position = position,
            }
            if complete {
                s.phase = RoundPhase::Complete;
                s.message = Some(messages::PUZZLE_COMPLETE);
                s.scores.record_point();
            }
        });

        if complete {
            log::debug!("jigsaw level {} complete", self.state.get().level);
            self.timers.arm_once(
                &mut self.advance_slot,
                ADVANCE_DELAY,
                JigsawEvent::NextLevel(round_id),
            );
        }
        snapped.is_some()
    }

    pub fn toggle_settings(&mut self) {
        self.state.update(|s| s.show_settings = !s.show_settings);
    }

    /// New grid size, back to level 1 with a zero score
    pub fn change_difficulty(&mut self, difficulty: JigsawDifficulty) {
        log::info!("jigsaw difficulty -> {}", difficulty.label());
        self.state.update(|s| {
            s.difficulty = difficulty;
            s.show_settings = false;
            s.scores.reset_score();
        });
        self.new_puzzle(1);
    }

    /// Recompute the board for a new canvas. Placed pieces follow their
    /// cells; loose pieces are re-trayed only when the tray moves.
    fn relayout(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let current = self.state.get();
        let layout = PuzzleLayout::calculate(viewport, current.layout.grid);
        let tray_moved = layout.tray != current.layout.tray;

        let loose = current.pieces.iter().filter(|p| !p.is_placed).count();
        let mut slots = if tray_moved {
            tray_positions(&mut self.rng, &layout, viewport, loose)
        } else {
            Vec::new()
        }
        .into_iter();

        let mut pieces = current.pieces.clone();
        for piece in &mut pieces {
            if piece.is_placed {
                piece.position = viewport.to_normalized(layout.cell_center(piece.correct));
            } else if let Some(slot) = slots.next() {
                piece.position = slot;
            }
        }
        if tray_moved {
            self.drag = None;
        }
        self.state.update(|s| {
            s.layout = layout;
            s.pieces = pieces;
        });
    }
}

impl Timed for JigsawEngine {
    type Event = JigsawEvent;

    fn timers(&mut self) -> &mut Scheduler<JigsawEvent> {
        &mut self.timers
    }

    fn on_timer(&mut self, event: JigsawEvent) {
        match event {
            JigsawEvent::NextLevel(id) if id == self.state.get().round_id => self.next_level(),
            JigsawEvent::NextLevel(id) => log::trace!("stale advance for puzzle {id}"),
        }
    }
}

impl MiniGame for JigsawEngine {
    fn kind(&self) -> GameKind {
        GameKind::Jigsaw
    }

    fn on_drag_start(&mut self, pos: Vec2) {
        if self.paused || !self.state.get().phase.accepts_input() {
            return;
        }
        self.drag = self.piece_at(pos).map(|piece| DragPreview {
            piece,
            position: self.state.get().pieces[piece].position,
            last_pointer: pos,
        });
    }

    fn on_drag_move(&mut self, pos: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            let moved = drag.position + (pos - drag.last_pointer);
            drag.position = clamp_axes(moved, EDGE_MARGIN, 1.0 - EDGE_MARGIN);
            drag.last_pointer = pos;
        }
    }

    fn on_drag_end(&mut self, pos: Vec2) {
        self.on_drag_move(pos);
        if let Some(drag) = self.drag.take() {
            self.end_drag(drag.piece, drag.position);
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.relayout(viewport);
        }
    }

    fn toggle_settings(&mut self) {
        JigsawEngine::toggle_settings(self);
    }

    fn advance(&mut self, elapsed: Duration) {
        if !self.paused {
            drive(self, elapsed);
        }
    }

    fn pause(&mut self) {
        self.paused = true;
        self.drag = None;
        self.timers.cancel(&mut self.advance_slot);
    }

    fn resume(&mut self) {
        self.paused = false;
        if self.state.get().is_complete() {
            self.next_level();
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
