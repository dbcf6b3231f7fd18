//! UI button rectangles
//!
//! The phase logic owns these and hit-tests presses against them. The
//! renderer only draws them.

use glam::Vec2;
use serde::Serialize;

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Rectangle of size `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x * 0.5,
            y: center.y - size.y * 0.5,
            w: size.x,
            h: size.y,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Buttons for the menu and overlay phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Buttons {
    pub start: Rect,
    pub restart: Rect,
    pub submit: Rect,
}

impl Buttons {
    /// Lay the buttons out for a play area
    pub fn layout(arena: Vec2) -> Self {
        let center = arena * 0.5;
        let width = (arena.x * 0.4).clamp(120.0, 260.0);
        let size = Vec2::new(width, 52.0);
        Self {
            start: Rect::centered(center + Vec2::new(0.0, 40.0), size),
            restart: Rect::centered(center + Vec2::new(0.0, arena.y * 0.25), size),
            submit: Rect::centered(center + Vec2::new(0.0, 90.0), size),
        }
    }
}

/// A press hits `rect`, or carries no position (keyboard)
pub fn activates(rect: &Rect, at: Option<Vec2>) -> bool {
    at.is_none_or(|p| rect.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::centered(Vec2::new(50.0, 50.0), Vec2::new(20.0, 10.0));
        assert!(r.contains(Vec2::new(40.0, 45.0)));
        assert!(r.contains(Vec2::new(60.0, 55.0)));
        assert!(!r.contains(Vec2::new(61.0, 50.0)));
    }

    #[test]
    fn test_press_without_position_activates() {
        let buttons = Buttons::layout(Vec2::new(800.0, 600.0));
        assert!(activates(&buttons.start, None));
        assert!(activates(&buttons.start, Some(Vec2::new(400.0, 340.0))));
        assert!(!activates(&buttons.start, Some(Vec2::new(5.0, 5.0))));
    }

    #[test]
    fn test_layout_tracks_size() {
        let small = Buttons::layout(Vec2::new(400.0, 300.0));
        let big = Buttons::layout(Vec2::new(1600.0, 1200.0));
        assert!(big.restart.y > small.restart.y);
        assert!(big.start.w >= small.start.w);
    }
}
