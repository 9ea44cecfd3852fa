//! Axis-aligned rectangle
//!
//! A `Rect` is stored as two corners: `v1` top-left and `v2` bottom-right.
//! Every constructor and mutator re-orders the corners so that
//! `v1.x <= v2.x && v1.y <= v2.y` always holds.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::vec::{Vec2, Vec2Ext};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RectCorners", into = "RectCorners")]
pub struct Rect {
    v1: Vec2,
    v2: Vec2,
}

/// Serialized shape of a `Rect`; deserializing goes back through `Rect::new`
#[derive(Serialize, Deserialize)]
struct RectCorners {
    v1: Vec2,
    v2: Vec2,
}

impl From<RectCorners> for Rect {
    fn from(c: RectCorners) -> Self {
        Rect::new(c.v1, c.v2)
    }
}

impl From<Rect> for RectCorners {
    fn from(r: Rect) -> Self {
        RectCorners { v1: r.v1, v2: r.v2 }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Rect {
    /// Both corners at the origin
    pub const ZERO: Rect = Rect { v1: Vec2::ZERO, v2: Vec2::ZERO };
    /// Both corners at (1, 1)
    pub const ONE: Rect = Rect { v1: Vec2::ONE, v2: Vec2::ONE };
    /// (-1, -1) to (1, 1)
    pub const FULL: Rect = Rect { v1: Vec2::NEG_ONE, v2: Vec2::ONE };
    /// Upper-right quadrant of the unit square (screen coordinates)
    pub const QUADRANT_I: Rect = Rect { v1: Vec2::new(0.0, -1.0), v2: Vec2::new(1.0, 0.0) };
    /// Upper-left quadrant
    pub const QUADRANT_II: Rect = Rect { v1: Vec2::NEG_ONE, v2: Vec2::ZERO };
    /// Lower-left quadrant
    pub const QUADRANT_III: Rect = Rect { v1: Vec2::new(-1.0, 0.0), v2: Vec2::new(0.0, 1.0) };
    /// Lower-right quadrant
    pub const QUADRANT_IV: Rect = Rect { v1: Vec2::ZERO, v2: Vec2::ONE };

    /// Build from two opposite corners in any order
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { v1: a.min(b), v2: a.max(b) }
    }

    /// Build from raw corner coordinates in any order
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    /// Top-left corner
    #[inline]
    pub fn v1(&self) -> Vec2 {
        self.v1
    }

    /// Bottom-right corner
    #[inline]
    pub fn v2(&self) -> Vec2 {
        self.v2
    }

    /// Replace the first corner; the pair is re-ordered afterwards
    pub fn set_v1(&mut self, v: Vec2) {
        *self = Rect::new(v, self.v2);
    }

    /// Replace the second corner; the pair is re-ordered afterwards
    pub fn set_v2(&mut self, v: Vec2) {
        *self = Rect::new(self.v1, v);
    }

    /// Top-left corner snapped to the cell grid
    #[inline]
    pub fn iv1(&self) -> Vec2 {
        self.v1.rounded()
    }

    /// Bottom-right corner snapped to the cell grid
    #[inline]
    pub fn iv2(&self) -> Vec2 {
        self.v2.rounded()
    }

    pub fn left(&self) -> f64 {
        self.v1.x
    }

    pub fn right(&self) -> f64 {
        self.v2.x
    }

    pub fn top(&self) -> f64 {
        self.v1.y
    }

    pub fn bottom(&self) -> f64 {
        self.v2.y
    }

    pub fn width(&self) -> f64 {
        self.v2.x - self.v1.x
    }

    pub fn height(&self) -> f64 {
        self.v2.y - self.v1.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Width in whole cells, after snapping the corners
    pub fn int_width(&self) -> i64 {
        self.v2.ix() - self.v1.ix()
    }

    /// Height in whole cells, after snapping the corners
    pub fn int_height(&self) -> i64 {
        self.v2.iy() - self.v1.iy()
    }

    pub fn int_area(&self) -> i64 {
        self.int_width() * self.int_height()
    }

    pub fn center(&self) -> Vec2 {
        (self.v1 + self.v2) / 2.0
    }

    pub fn rounded_center(&self) -> Vec2 {
        self.center().rounded()
    }

    /// Copy with both corners snapped to the cell grid
    pub fn rounded(&self) -> Rect {
        Rect::new(self.iv1(), self.iv2())
    }

    /// Translate both corners by `v`
    pub fn offset(&self, v: Vec2) -> Rect {
        Rect::new(self.v1 + v, self.v2 + v)
    }

    /// Move each corner by the matching corner of `by`
    pub fn transform(&self, by: Rect) -> Rect {
        Rect::new(self.v1 + by.v1, self.v2 + by.v2)
    }

    /// Scale about the centre; 1.0 keeps the size
    pub fn scale_outwards(&self, scale: f64) -> Rect {
        let push = Vec2::new(self.width(), self.height()) * scale / 2.0;
        let c = self.center();
        Rect::new(c - push, c + push)
    }

    /// Scale about the origin
    pub fn scale_global(&self, factor: f64) -> Rect {
        *self * factor
    }

    /// Interpolate both corners toward `end`
    pub fn lerp(&self, end: Rect, t: f64) -> Rect {
        Rect::new(self.v1.lerp(end.v1, t), self.v2.lerp(end.v2, t))
    }

    /// Interpolate with a separate factor per corner: `t.x` for `v1`, `t.y` for `v2`
    pub fn lerp_per_corner(&self, end: Rect, t: Vec2) -> Rect {
        Rect::new(self.v1.lerp(end.v1, t.x), self.v2.lerp(end.v2, t.y))
    }

    /// Region shared with `other`, if they overlap
    pub fn overlap(&self, other: Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        Some(self.clamped_into(other))
    }

    /// Both corners clamped into `bounds`
    pub fn clamped_into(&self, bounds: Rect) -> Rect {
        Rect::new(
            self.v1.clamped_into(bounds.v1, bounds.v2),
            self.v2.clamped_into(bounds.v1, bounds.v2),
        )
    }

    /// Inclusive point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.v1.x && p.x <= self.v2.x && p.y >= self.v1.y && p.y <= self.v2.y
    }

    /// Separating-axis overlap test; touching edges count as overlapping
    pub fn intersects(&self, other: Rect) -> bool {
        if other.v1.x > self.v2.x || other.v2.x < self.v1.x {
            return false;
        }
        if other.v1.y > self.v2.y || other.v2.y < self.v1.y {
            return false;
        }
        true
    }
}

impl Add<Vec2> for Rect {
    type Output = Rect;

    fn add(self, v: Vec2) -> Rect {
        self.offset(v)
    }
}

impl Sub<Vec2> for Rect {
    type Output = Rect;

    fn sub(self, v: Vec2) -> Rect {
        self.offset(-v)
    }
}

impl Mul<f64> for Rect {
    type Output = Rect;

    fn mul(self, s: f64) -> Rect {
        Rect::new(self.v1 * s, self.v2 * s)
    }
}

impl Neg for Rect {
    type Output = Rect;

    fn neg(self) -> Rect {
        Rect::new(-self.v1, -self.v2)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ ({:.2}, {:.2}), ({:.2}, {:.2}) }}",
            self.v1.x, self.v1.y, self.v2.x, self.v2.y
        )
    }
}
