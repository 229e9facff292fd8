//! Puzzle board and tray geometry
//!
//! All measurements here are canvas pixels; pieces store normalized
//! positions, so callers convert through the `Viewport` at the boundary.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use crate::sim::{Viewport, clamp_axes};

/// Canvas counts as short when `height < SHORT_ASPECT * width`
pub const SHORT_ASPECT: f32 = 0.75;
/// Tray columns in the side-tray arrangement
pub const SIDE_TRAY_COLUMNS: usize = 2;
/// Pieces are kept this far from the canvas edges
pub const EDGE_MARGIN: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrayKind {
    /// Full-width strip under the board, random scatter
    Bottom,
    /// Column block beside the board, packed rows
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PuzzleLayout {
    /// Board top-left
    pub start: Vec2,
    /// Board edge (square)
    pub size: f32,
    pub grid: usize,
    pub tray: TrayKind,
    pub tray_start: Vec2,
    pub tray_size: Vec2,
}

impl PuzzleLayout {
    /// Fit a `grid` x `grid` board and its tray into the viewport
    pub fn calculate(viewport: Viewport, grid: usize) -> Self {
        let (w, h) = (viewport.width, viewport.height);
        let grid = grid.max(1);

        if h < SHORT_ASPECT * w {
            let pad = Vec2::new(w, h) * 0.05;
            let size = (w * 0.6).min(h * 0.85);
            let start = Vec2::new(pad.x, (h - size) / 2.0);
            let tray_x = start.x + size + pad.x;
            let tray_w = (w - tray_x - pad.x).max(w * 0.15);
            Self {
                start,
                size,
                grid,
                tray: TrayKind::Side,
                tray_start: Vec2::new(tray_x, pad.y),
                tray_size: Vec2::new(tray_w, h - 2.0 * pad.y),
            }
        } else {
            let size = (w * 0.8).min(h * 0.5);
            let tray_y = h * 0.6;
            Self {
                start: Vec2::new((w - size) / 2.0, h * 0.05),
                size,
                grid,
                tray: TrayKind::Bottom,
                tray_start: Vec2::new(0.0, tray_y),
                tray_size: Vec2::new(w, h - tray_y),
            }
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.size / self.grid as f32
    }

    /// Whether a pixel position lies on the board
    pub fn contains(&self, pixel: Vec2) -> bool {
        let rel = pixel - self.start;
        rel.x >= 0.0 && rel.y >= 0.0 && rel.x < self.size && rel.y < self.size
    }

    /// Board cell `(col, row)` under a pixel position
    pub fn cell_at(&self, pixel: Vec2) -> Option<(usize, usize)> {
        if !self.contains(pixel) {
            return None;
        }
        let cell = ((pixel - self.start) / self.cell_size()).floor();
        let (col, row) = (cell.x as usize, cell.y as usize);
        (col < self.grid && row < self.grid).then_some((col, row))
    }

    /// Pixel center of a board cell
    pub fn cell_center(&self, (col, row): (usize, usize)) -> Vec2 {
        self.start + (Vec2::new(col as f32, row as f32) + 0.5) * self.cell_size()
    }

    /// Packed tray slots for `count` pieces in the side tray, normalized
    pub fn side_tray_slots(&self, viewport: Viewport, count: usize) -> Vec<Vec2> {
        let rows = count.div_ceil(SIDE_TRAY_COLUMNS).max(1);
        let slot = self.tray_size / Vec2::new(SIDE_TRAY_COLUMNS as f32, rows as f32);
        (0..count)
            .map(|i| {
                let (col, row) = (i % SIDE_TRAY_COLUMNS, i / SIDE_TRAY_COLUMNS);
                let center =
                    self.tray_start + (Vec2::new(col as f32, row as f32) + 0.5) * slot;
                clamp_axes(
                    viewport.to_normalized(center),
                    EDGE_MARGIN,
                    1.0 - EDGE_MARGIN,
                )
            })
            .collect()
    }
}

/// Random spot in the bottom tray, normalized
pub fn scatter_bottom<R: Rng>(rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.random::<f32>() * 0.7 + 0.15,
        rng.random::<f32>() * 0.25 + 0.7,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_canvas_uses_bottom_tray() {
        let layout = PuzzleLayout::calculate(Viewport::new(1000.0, 1000.0), 3);
        assert_eq!(layout.tray, TrayKind::Bottom);
        assert_eq!(layout.size, 500.0);
        assert!(layout.start.abs_diff_eq(Vec2::new(250.0, 50.0), 1e-3));
        assert!(layout.tray_start.abs_diff_eq(Vec2::new(0.0, 600.0), 1e-3));
    }

    #[test]
    fn test_wide_canvas_uses_side_tray() {
        let layout = PuzzleLayout::calculate(Viewport::new(1600.0, 900.0), 2);
        assert_eq!(layout.tray, TrayKind::Side);
        assert!((layout.size - 765.0).abs() < 1e-3);
        assert!((layout.start.x - 80.0).abs() < 1e-3);
        assert!(layout.tray_start.x > layout.start.x + layout.size);
    }

    #[test]
    fn test_cell_lookup_round_trips_centers() {
        let layout = PuzzleLayout::calculate(Viewport::default(), 4);
        for row in 0..4 {
            for col in 0..4 {
                assert_eq!(
                    layout.cell_at(layout.cell_center((col, row))),
                    Some((col, row))
                );
            }
        }
        assert_eq!(layout.cell_at(Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_side_slots_stay_inside_margin() {
        let viewport = Viewport::new(1600.0, 900.0);
        let layout = PuzzleLayout::calculate(viewport, 4);
        let slots = layout.side_tray_slots(viewport, 16);
        assert_eq!(slots.len(), 16);
        for slot in slots {
            assert!(slot.x >= EDGE_MARGIN && slot.x <= 1.0 - EDGE_MARGIN);
            assert!(slot.y >= EDGE_MARGIN && slot.y <= 1.0 - EDGE_MARGIN);
        }
    }
}
