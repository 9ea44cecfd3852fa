//! Collision shapes
//!
//! A `Collider` describes a shape relative to its owner. Nothing here stores an
//! absolute position: tests go through [`Collider::at`], which pairs the shape
//! with the owner's position for the duration of one query.
//!
//! Dot and Rect shapes work on the cell grid (both sides are rounded before
//! comparing). Circles measure continuous distance from their rounded centre,
//! inclusive for their own containment and strict when another shape asks
//! through [`Placed::circle_intersect`]. Polygons only support point
//! containment; polygon-vs-shape tests always report no contact.

use super::rect::Rect;
use super::vec::{Vec2, Vec2Ext};

/// Shape attached to a game object
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Collider {
    /// Never collides
    #[default]
    Empty,
    /// A single cell at `offset` from the owner
    Dot { offset: Vec2 },
    /// Axis-aligned box in owner-local coordinates
    Rect(Rect),
    /// Disc centred on the owner
    Circle { radius: f64 },
    /// Closed polygon in owner-local coordinates
    Polygon { vertices: Vec<Vec2>, bbox: Rect },
}

impl Collider {
    /// Dot on the owner's own cell
    pub fn dot() -> Self {
        Collider::Dot { offset: Vec2::ZERO }
    }

    pub fn dot_at(offset: Vec2) -> Self {
        Collider::Dot { offset }
    }

    pub fn rect(local: Rect) -> Self {
        Collider::Rect(local)
    }

    pub fn circle(radius: f64) -> Self {
        Collider::Circle { radius: radius.abs() }
    }

    /// Polygon from its vertices; the bounding box is computed once here
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        let bbox = match vertices.split_first() {
            Some((first, rest)) => {
                let (lo, hi) = rest
                    .iter()
                    .fold((*first, *first), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
                Rect::new(lo, hi)
            }
            None => Rect::ZERO,
        };
        Collider::Polygon { vertices, bbox }
    }

    /// Anchor the shape at the owner's position
    #[inline]
    pub fn at(&self, owner: Vec2) -> Placed<'_> {
        Placed { shape: self, owner }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Collider::Empty)
    }

    /// Short name for debug output
    pub fn kind_name(&self) -> &'static str {
        match self {
            Collider::Empty => "empty",
            Collider::Dot { .. } => "dot",
            Collider::Rect(_) => "rect",
            Collider::Circle { .. } => "circle",
            Collider::Polygon { .. } => "polygon",
        }
    }
}

/// A collider anchored at an owner position for one query
#[derive(Debug, Clone, Copy)]
pub struct Placed<'a> {
    shape: &'a Collider,
    owner: Vec2,
}

impl Placed<'_> {
    pub fn owner(&self) -> Vec2 {
        self.owner
    }

    /// Whether `point` lies within the shape
    pub fn inside(&self, point: Vec2) -> bool {
        match self.shape {
            Collider::Empty => false,
            Collider::Dot { offset } => dot_cell(self.owner, *offset) == point.rounded(),
            Collider::Rect(local) => (*local + self.owner).rounded().contains(point.rounded()),
            Collider::Circle { radius } => self.owner.rounded().distance(point) <= *radius,
            Collider::Polygon { vertices, bbox } => {
                let local = point - self.owner;
                if !bbox.rounded().contains(local.rounded()) {
                    return false;
                }
                even_odd_contains(vertices, local)
            }
        }
    }

    /// Pairwise test; each shape hands the other its specialised query
    pub fn intersects(&self, other: &Placed<'_>) -> bool {
        match self.shape {
            Collider::Empty | Collider::Polygon { .. } => false,
            Collider::Dot { offset } => other.inside(dot_cell(self.owner, *offset)),
            Collider::Rect(local) => other.rect_intersect(*local + self.owner),
            Collider::Circle { radius } => other.circle_intersect(self.owner.rounded(), *radius),
        }
    }

    /// Whether the shape touches an absolute rectangle
    pub fn rect_intersect(&self, rect: Rect) -> bool {
        match self.shape {
            Collider::Empty | Collider::Polygon { .. } => false,
            Collider::Dot { offset } => {
                dot_cell(self.owner, *offset).inside_rect(rect.iv1(), rect.iv2())
            }
            Collider::Rect(local) => (*local + self.owner).rounded().intersects(rect.rounded()),
            Collider::Circle { .. } => {
                let center = self.owner.rounded();
                self.inside(center.clamped_into(rect.iv1(), rect.iv2()))
            }
        }
    }

    /// Whether the shape touches a circle; the distance check is strict
    pub fn circle_intersect(&self, center: Vec2, radius: f64) -> bool {
        match self.shape {
            Collider::Empty | Collider::Polygon { .. } => false,
            Collider::Dot { offset } => dot_cell(self.owner, *offset).distance(center) < radius,
            Collider::Rect(local) => {
                let area = (*local + self.owner).rounded();
                let nearest = center.clamped_into(area.v1(), area.v2());
                center.distance(nearest) < radius
            }
            Collider::Circle { .. } => {
                // Pull our centre toward the other circle until it lies within it
                let own = self.owner.rounded();
                let candidate = if own.distance(center) <= radius {
                    own
                } else {
                    center + center.direction_to_scaled(own, radius)
                };
                self.inside(candidate)
            }
        }
    }

    /// Absolute bounding box, `None` for the empty shape
    pub fn bounds(&self) -> Option<Rect> {
        match self.shape {
            Collider::Empty => None,
            Collider::Dot { offset } => Some(Rect::FULL + (self.owner + *offset)),
            Collider::Rect(local) => Some(*local + self.owner),
            Collider::Circle { radius } => Some(Rect::new(
                self.owner - Vec2::splat(*radius),
                self.owner + Vec2::splat(*radius),
            )),
            Collider::Polygon { bbox, .. } => Some(*bbox + self.owner),
        }
    }
}

#[inline]
fn dot_cell(owner: Vec2, offset: Vec2) -> Vec2 {
    (owner + offset).rounded()
}

/// Even-odd rule: cast a ray toward +x and count edge crossings
fn even_odd_contains(vertices: &[Vec2], p: Vec2) -> bool {
    let Some(mut prev) = vertices.last().copied() else {
        return false;
    };
    let mut inside = false;
    for &cur in vertices {
        if (cur.y > p.y) != (prev.y > p.y) {
            let cross_x = (prev.x - cur.x) * (p.y - cur.y) / (prev.y - cur.y) + cur.x;
            if p.x < cross_x {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}
