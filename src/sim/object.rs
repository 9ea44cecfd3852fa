//! Entity state shared by every game object

use crate::consts::DEFAULT_LAYER;

use super::collider::{Collider, Placed};
use super::rect::Rect;
use super::render::Display;
use super::vec::Vec2;

/// Position, motion, shape and appearance of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct GameObject {
    pub pos: Vec2,
    /// Added to `pos` at the start of every update
    pub vel: Vec2,
    pub collider: Collider,
    pub display: Option<Display>,
    /// Ordering hint; not used by the engine
    pub layer: u8,
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl GameObject {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            collider: Collider::Empty,
            display: None,
            layer: DEFAULT_LAYER,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = collider;
        self
    }

    pub fn with_display(mut self, display: Display) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Apply one tick of velocity
    #[inline]
    pub fn advance(&mut self) {
        self.pos += self.vel;
    }

    /// The collider anchored at the current position
    pub fn shape(&self) -> Placed<'_> {
        self.collider.at(self.pos)
    }

    pub fn collides_with(&self, other: &GameObject) -> bool {
        self.shape().intersects(&other.shape())
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.shape().bounds()
    }

    pub fn is_visible(&self) -> bool {
        self.display.as_ref().is_some_and(|d| d.visible)
    }

    pub fn set_visible(&mut self, visible: bool) {
        if let Some(display) = self.display.as_mut() {
            display.visible = visible;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let obj = GameObject::default();
        assert_eq!(obj.collider, Collider::Empty);
        assert_eq!(obj.layer, DEFAULT_LAYER);
        assert!(!obj.is_visible());
        assert_eq!(obj.bounds(), None);
    }

    #[test]
    fn test_advance_moves_by_velocity() {
        let mut obj = GameObject::new(Vec2::new(1.0, 1.0)).with_velocity(Vec2::new(0.5, -1.0));
        obj.advance();
        obj.advance();
        assert_eq!(obj.pos, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_collides_with_follows_position() {
        let a = GameObject::new(Vec2::ZERO).with_collider(Collider::rect(Rect::FULL));
        let mut b = GameObject::new(Vec2::new(5.0, 0.0)).with_collider(Collider::dot());
        assert!(!a.collides_with(&b));
        b.pos = Vec2::new(1.0, 1.0);
        assert!(a.collides_with(&b));
        assert!(b.collides_with(&a));
    }

    #[test]
    fn test_visibility_toggle() {
        let mut obj = GameObject::default().with_display(Display::glyph('*'));
        assert!(obj.is_visible());
        obj.set_visible(false);
        assert!(!obj.is_visible());
    }
}
