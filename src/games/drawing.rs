//! Free drawing canvas
//!
//! No rounds and no scoring. The published state is the list of finished
//! elements; the stroke under the finger stays in the engine until it is
//! finished.

use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{GameKind, MiniGame};
use crate::highscores::ScoreBoard;
use crate::sim::{Published, clamp_axes};

pub const DEFAULT_STROKE_WIDTH: f32 = 10.0;
pub const MIN_STROKE_WIDTH: f32 = 5.0;
pub const MAX_STROKE_WIDTH: f32 = 100.0;
pub const ERASER_WIDTH: f32 = 40.0;

/// 0xAARRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const PURPLE: Color = Color(0xFF9B7AFF);
    pub const PINK: Color = Color(0xFFFF8DC1);
    pub const YELLOW: Color = Color(0xFFFFE066);
    pub const GREEN: Color = Color(0xFF7AE582);
    pub const BLUE: Color = Color(0xFF73D0FF);
    pub const ORANGE: Color = Color(0xFFFFB347);
    pub const RED: Color = Color(0xFFFF6B6B);
    pub const TEAL: Color = Color(0xFF5FE3E0);
    pub const BLACK: Color = Color(0xFF000000);
    pub const GRAY: Color = Color(0xFF888888);
    pub const WHITE: Color = Color(0xFFFFFFFF);

    pub fn rgba(self) -> [f32; 4] {
        let channel = |shift: u32| ((self.0 >> shift) & 0xFF) as f32 / 255.0;
        [channel(16), channel(8), channel(0), channel(24)]
    }
}

/// Colors offered by the picker
pub const PALETTE: [Color; 10] = [
    Color::PURPLE,
    Color::PINK,
    Color::YELLOW,
    Color::GREEN,
    Color::BLUE,
    Color::ORANGE,
    Color::RED,
    Color::TEAL,
    Color::BLACK,
    Color::GRAY,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawingTool {
    #[default]
    Pen,
    Eraser,
    Stamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StampKind {
    #[default]
    Star,
    Heart,
    Smile,
    Flower,
    Sun,
    Cloud,
    Moon,
    Tree,
    Car,
    House,
    Apple,
    Fish,
    Butterfly,
    Lightning,
    Diamond,
    Note,
    Leaf,
    Drop,
    Balloon,
    IceCream,
    Boat,
}

impl StampKind {
    pub const ALL: [StampKind; 21] = [
        StampKind::Star,
        StampKind::Heart,
        StampKind::Smile,
        StampKind::Flower,
        StampKind::Sun,
        StampKind::Cloud,
        StampKind::Moon,
        StampKind::Tree,
        StampKind::Car,
        StampKind::House,
        StampKind::Apple,
        StampKind::Fish,
        StampKind::Butterfly,
        StampKind::Lightning,
        StampKind::Diamond,
        StampKind::Note,
        StampKind::Leaf,
        StampKind::Drop,
        StampKind::Balloon,
        StampKind::IceCream,
        StampKind::Boat,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Vec2>,
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Path(Stroke),
    Stamp {
        position: Vec2,
        kind: StampKind,
        color: Color,
        size: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingState {
    pub elements: Vec<Element>,
    pub tool: DrawingTool,
    pub color: Color,
    pub stroke_width: f32,
    pub stamp: StampKind,
    pub show_clear_dialog: bool,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            tool: DrawingTool::Pen,
            color: Color::PURPLE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            stamp: StampKind::Star,
            show_clear_dialog: false,
        }
    }
}

#[derive(Default)]
pub struct DrawingEngine {
    state: Published<DrawingState>,
    current: Option<Stroke>,
}

impl DrawingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DrawingState {
        self.state.get()
    }

    pub fn snapshot(&self) -> Arc<DrawingState> {
        self.state.snapshot()
    }

    /// Stroke being drawn, not yet part of the state
    pub fn current_stroke(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    fn stroke_style(&self) -> (Color, f32) {
        let state = self.state.get();
        match state.tool {
            DrawingTool::Eraser => (Color::WHITE, ERASER_WIDTH),
            _ => (state.color, state.stroke_width),
        }
    }

    pub fn start_drawing(&mut self, pos: Vec2) {
        if self.state.get().tool == DrawingTool::Stamp {
            return;
        }
        let (color, width) = self.stroke_style();
        self.current = Some(Stroke {
            points: vec![clamp_axes(pos, 0.0, 1.0)],
            color,
            width,
        });
    }

    pub fn update_drawing(&mut self, pos: Vec2) {
        if self.state.get().tool == DrawingTool::Stamp {
            return;
        }
        match self.current.as_mut() {
            Some(stroke) => stroke.points.push(clamp_axes(pos, 0.0, 1.0)),
            None => self.start_drawing(pos),
        }
    }

    pub fn finish_drawing(&mut self) {
        let Some(stroke) = self.current.take() else {
            return;
        };
        if stroke.points.is_empty() {
            return;
        }
        self.state.update(|s| s.elements.push(Element::Path(stroke)));
    }

    /// Drop the selected stamp, sized by the stroke width
    pub fn add_stamp(&mut self, pos: Vec2) {
        let state = self.state.get();
        if state.tool != DrawingTool::Stamp {
            return;
        }
        let element = Element::Stamp {
            position: clamp_axes(pos, 0.0, 1.0),
            kind: state.stamp,
            color: state.color,
            size: state.stroke_width,
        };
        self.state.update(|s| s.elements.push(element));
    }

    pub fn select_tool(&mut self, tool: DrawingTool) {
        self.current = None;
        self.state.update(|s| s.tool = tool);
    }

    pub fn select_color(&mut self, color: Color) {
        self.state.update(|s| s.color = color);
    }

    pub fn select_stamp(&mut self, stamp: StampKind) {
        self.state.update(|s| s.stamp = stamp);
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        let width = if width.is_finite() {
            width.clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
        } else {
            DEFAULT_STROKE_WIDTH
        };
        self.state.update(|s| s.stroke_width = width);
    }

    pub fn toggle_clear_dialog(&mut self) {
        self.state
            .update(|s| s.show_clear_dialog = !s.show_clear_dialog);
    }

    pub fn clear_all(&mut self) {
        self.current = None;
        self.state.update(|s| {
            s.elements.clear();
            s.show_clear_dialog = false;
        });
    }
}

impl MiniGame for DrawingEngine {
    fn kind(&self) -> GameKind {
        GameKind::Drawing
    }

    fn on_tap(&mut self, pos: Vec2) {
        self.add_stamp(pos);
    }

    fn on_drag_start(&mut self, pos: Vec2) {
        self.start_drawing(pos);
    }

    fn on_drag_move(&mut self, pos: Vec2) {
        self.update_drawing(pos);
    }

    fn on_drag_end(&mut self, _pos: Vec2) {
        self.finish_drawing();
    }

    fn toggle_settings(&mut self) {
        self.toggle_clear_dialog();
    }

    fn advance(&mut self, _elapsed: Duration) {}

    fn pause(&mut self) {
        self.finish_drawing();
    }

    fn resume(&mut self) {}

    fn scores(&self) -> ScoreBoard {
        ScoreBoard::new()
    }

    fn pending_timers(&self) -> usize {
        0
    }

    fn version(&self) -> u64 {
        self.state.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_is_published_only_when_finished() {
        let mut canvas = DrawingEngine::new();
        let version = canvas.version();
        canvas.on_drag_start(Vec2::new(0.1, 0.1));
        canvas.on_drag_move(Vec2::new(0.2, 0.2));
        canvas.on_drag_move(Vec2::new(0.3, 0.3));
        assert_eq!(canvas.version(), version);
        assert_eq!(canvas.current_stroke().map(|s| s.points.len()), Some(3));

        canvas.on_drag_end(Vec2::new(0.3, 0.3));
        assert!(canvas.current_stroke().is_none());
        assert_eq!(canvas.state().elements.len(), 1);
        match &canvas.state().elements[0] {
            Element::Path(stroke) => {
                assert_eq!(stroke.color, Color::PURPLE);
                assert_eq!(stroke.width, DEFAULT_STROKE_WIDTH);
            }
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn test_eraser_paints_wide_white() {
        let mut canvas = DrawingEngine::new();
        canvas.select_tool(DrawingTool::Eraser);
        canvas.start_drawing(Vec2::new(0.5, 0.5));
        let stroke = canvas.current_stroke().unwrap();
        assert_eq!(stroke.color, Color::WHITE);
        assert_eq!(stroke.width, ERASER_WIDTH);
    }

    #[test]
    fn test_stamps_only_with_stamp_tool() {
        let mut canvas = DrawingEngine::new();
        canvas.on_tap(Vec2::new(0.5, 0.5));
        assert!(canvas.state().elements.is_empty());

        canvas.select_tool(DrawingTool::Stamp);
        canvas.select_stamp(StampKind::Boat);
        canvas.set_stroke_width(250.0);
        canvas.on_drag_start(Vec2::new(0.2, 0.2));
        assert!(canvas.current_stroke().is_none());

        canvas.on_tap(Vec2::new(0.5, 0.5));
        assert_eq!(
            canvas.state().elements,
            vec![Element::Stamp {
                position: Vec2::new(0.5, 0.5),
                kind: StampKind::Boat,
                color: Color::PURPLE,
                size: MAX_STROKE_WIDTH,
            }]
        );
    }

    #[test]
    fn test_clear_all_closes_dialog() {
        let mut canvas = DrawingEngine::new();
        canvas.on_drag_start(Vec2::new(0.1, 0.1));
        canvas.on_drag_end(Vec2::new(0.1, 0.1));
        canvas.toggle_clear_dialog();
        assert!(canvas.state().show_clear_dialog);

        canvas.clear_all();
        assert!(canvas.state().elements.is_empty());
        assert!(!canvas.state().show_clear_dialog);
    }

    #[test]
    fn test_palette_color_channels() {
        assert_eq!(Color::WHITE.rgba(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color::BLACK.rgba(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(PALETTE.len(), 10);
        assert_eq!(StampKind::ALL.len(), 21);
    }
}
