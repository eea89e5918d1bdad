//! Axis-aligned rectangles and overlap tests
//!
//! Coordinates follow the page layout: y grows downward, so `top < bottom`.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size
    pub fn from_min_size(min: Vec2, size: Vec2) -> Self {
        Self {
            left: min.x,
            top: min.y,
            right: min.x + size.x,
            bottom: min.y + size.y,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    /// Closed-interval overlap on both axes. Touching edges count.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}
