//! Axis-Aligned Rectangles
//!
//! Foundation for every collision check in the simulation. Rectangles are
//! stored as top-left corner plus size, matching screen coordinates.
//!
//! Touching edges do NOT count as an overlap. Ground and head checks probe
//! explicitly with a one-unit offset (see [`Rect::offset`]).

use serde::{Serialize, Deserialize};

use super::vec2::Vec2;

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle of the given size centered on `center`.
    #[inline]
    pub fn centered(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// Left edge x.
    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge x.
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Top edge y.
    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge y (+Y down).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Move so the center lands on `center`.
    #[inline]
    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w / 2.0;
        self.y = center.y - self.h / 2.0;
    }

    /// Copy shifted by (dx, dy).
    #[inline]
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// True if the horizontal extents overlap.
    #[inline]
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left() < other.right() && other.left() < self.right()
    }

    /// True if the vertical extents overlap.
    #[inline]
    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.top() < other.bottom() && other.top() < self.bottom()
    }

    /// Axis-aligned overlap test.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        intersects(self, other)
    }
}

/// Axis-aligned overlap test. Touching edges are not a collision.
#[inline]
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.overlaps_x(b) && a.overlaps_y(b)
}
