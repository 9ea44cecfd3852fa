//! 2D vector helpers
//!
//! `Vec2` is glam's double-precision vector. Screen convention: +x is right,
//! +y is down, so `UP` points toward negative y.

pub use glam::DVec2 as Vec2;

use crate::{cell_index, round_cell};

/// Unit vector toward the top of the screen
pub const UP: Vec2 = Vec2::new(0.0, -1.0);
/// Unit vector toward the bottom of the screen
pub const DOWN: Vec2 = Vec2::new(0.0, 1.0);
/// Unit vector toward the left edge
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
/// Unit vector toward the right edge
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);

/// Vectors shorter than this normalize to zero
const NORMALIZE_EPSILON: f64 = 0.001;

/// Engine operations on `Vec2` that glam doesn't provide in the form we need
pub trait Vec2Ext: Sized {
    /// Shift by the given amounts
    fn offset(self, dx: f64, dy: f64) -> Self;
    /// Snap both components to the nearest cell
    fn rounded(self) -> Self;
    /// Integer cell column
    fn ix(self) -> i64;
    /// Integer cell row
    fn iy(self) -> i64;
    /// Component-wise sign, with zero mapping to zero
    fn sign(self) -> Self;
    /// Unit vector, or zero when the length is negligible
    fn normalized(self) -> Self;
    /// Unit direction from `self` toward `other`
    fn direction_to(self, other: Self) -> Self;
    /// Direction from `self` toward `other`, scaled to `length`
    fn direction_to_scaled(self, other: Self, length: f64) -> Self;
    /// Angle between this vector and `other`, in radians
    fn angle_towards(self, other: Self) -> f64;
    /// Whether the point lies in the box spanned by two corners, in any order
    fn inside_rect(self, a: Self, b: Self) -> bool;
    /// Clamp into the box spanned by two corners, in any order
    fn clamped_into(self, a: Self, b: Self) -> Self;
    /// Rotate counter-clockwise (in math orientation) by `angle` radians
    fn rotated(self, angle: f64) -> Self;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn offset(self, dx: f64, dy: f64) -> Self {
        Vec2::new(self.x + dx, self.y + dy)
    }

    #[inline]
    fn rounded(self) -> Self {
        Vec2::new(round_cell(self.x), round_cell(self.y))
    }

    #[inline]
    fn ix(self) -> i64 {
        cell_index(self.x)
    }

    #[inline]
    fn iy(self) -> i64 {
        cell_index(self.y)
    }

    fn sign(self) -> Self {
        fn sign_of(v: f64) -> f64 {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        Vec2::new(sign_of(self.x), sign_of(self.y))
    }

    fn normalized(self) -> Self {
        let length = self.length();
        if length < NORMALIZE_EPSILON {
            return Vec2::ZERO;
        }
        self / length
    }

    #[inline]
    fn direction_to(self, other: Self) -> Self {
        (other - self).normalized()
    }

    #[inline]
    fn direction_to_scaled(self, other: Self, length: f64) -> Self {
        (other - self).normalized() * length
    }

    fn angle_towards(self, other: Self) -> f64 {
        self.normalized()
            .dot(other.normalized())
            .clamp(-1.0, 1.0)
            .acos()
    }

    fn inside_rect(self, a: Self, b: Self) -> bool {
        let min = a.min(b);
        let max = a.max(b);
        self.x >= min.x && self.x <= max.x && self.y >= min.y && self.y <= max.y
    }

    fn clamped_into(self, a: Self, b: Self) -> Self {
        // glam's clamp asserts min <= max, so order the corners first
        self.clamp(a.min(b), a.max(b))
    }

    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}
