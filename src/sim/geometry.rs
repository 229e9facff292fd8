//! Hit-testing primitives
//!
//! Games store positions normalized to `[0, 1]` per axis. Tests that depend on
//! real proportions (circles, squares) run in canvas pixels, so callers
//! convert with the current `Viewport` first.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pixel size of the canvas a game is rendered into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1000.0, 1000.0)
    }
}

impl Viewport {
    /// Degenerate sizes are bumped to one pixel
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn shorter_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Normalized -> pixels
    #[inline]
    pub fn to_pixels(&self, normalized: Vec2) -> Vec2 {
        normalized * self.size()
    }

    /// Pixels -> normalized
    #[inline]
    pub fn to_normalized(&self, pixels: Vec2) -> Vec2 {
        pixels / self.size()
    }
}

/// Clamp each axis of a position into `[min, max]`
#[inline]
pub fn clamp_axes(pos: Vec2, min: f32, max: f32) -> Vec2 {
    pos.clamp(Vec2::splat(min), Vec2::splat(max))
}

/// Inclusive circle test
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance(center) <= radius
}

/// Inclusive axis-aligned rectangle test
#[inline]
pub fn point_in_rect(point: Vec2, top_left: Vec2, size: Vec2) -> bool {
    point.x >= top_left.x
        && point.x <= top_left.x + size.x
        && point.y >= top_left.y
        && point.y <= top_left.y + size.y
}

/// Triangle test by edge cross-product signs.
///
/// The point is inside (or on an edge) when the three signed areas do not
/// disagree in sign. Winding order does not matter.
pub fn point_in_triangle(point: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    fn edge(p: Vec2, from: Vec2, to: Vec2) -> f32 {
        (p.x - to.x) * (from.y - to.y) - (from.x - to.x) * (p.y - to.y)
    }

    let d1 = edge(point, a, b);
    let d2 = edge(point, b, c);
    let d3 = edge(point, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}

/// Axis-aligned box in a y-up world (used by the runner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Aabb {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            left,
            right,
            bottom,
            top,
        }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.top > other.bottom
            && self.bottom < other.top
    }

    /// Shrink inward: `horizontal` from both sides, `top` from the top only
    pub fn shrunk(&self, horizontal: f32, top: f32) -> Aabb {
        Aabb {
            left: self.left + horizontal,
            right: self.right - horizontal,
            bottom: self.bottom,
            top: self.top - top,
        }
    }
}
