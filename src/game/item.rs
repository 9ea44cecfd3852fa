//! Collectible drops
//!
//! Items pop upward when spawned, then fall with a little gravity. Once the
//! player comes close they lock on and fly straight at them for good.

use crate::sim::behavior::Behavior;
use crate::sim::collider::Collider;
use crate::sim::events::{AddReason, RemoveReason};
use crate::sim::object::GameObject;
use crate::sim::render::Display;
use crate::sim::vec::{UP, Vec2, Vec2Ext};
use crate::sim::world::{EntityId, World};

use super::player::Player;

/// Player distance under which an item starts homing
pub const HOMING_RANGE: f64 = 6.0;
/// Homing speed cap, in cells per tick
pub const HOMING_SPEED: f64 = 1.2;
/// Terminal fall speed
pub const FALL_SPEED: f64 = 0.2;
/// Added to the fall speed every tick
pub const GRAVITY: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Raises shot power
    Power,
    /// Scores the player's current value per unit
    Point,
    /// Raises both score and value
    Value,
}

impl ItemKind {
    pub fn glyph(self) -> char {
        match self {
            ItemKind::Power => 'P',
            ItemKind::Point => '*',
            ItemKind::Value => '•',
        }
    }
}

/// What an item carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemContent {
    pub kind: ItemKind,
    pub amount: i64,
}

impl ItemContent {
    pub fn new(kind: ItemKind, amount: i64) -> Self {
        Self { kind, amount }
    }

    pub fn is_empty(&self) -> bool {
        self.amount <= 0
    }

    /// Split off up to `amount` units; never takes more than is left
    pub fn take(&mut self, amount: i64) -> ItemContent {
        let taken = amount.clamp(0, self.amount.max(0));
        self.amount -= taken;
        ItemContent::new(self.kind, taken)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    content: ItemContent,
    homing: bool,
}

impl Item {
    pub fn new(content: ItemContent) -> Self {
        Self { content, homing: false }
    }

    pub fn spawn(world: &mut World, pos: Vec2, content: ItemContent, reason: AddReason) -> EntityId {
        let object = GameObject::new(pos)
            .with_velocity(UP * FALL_SPEED)
            .with_collider(Collider::dot())
            .with_display(Display::glyph(content.kind.glyph()));
        world.add_instance(object, Item::new(content), reason)
    }

    pub fn content(&self) -> ItemContent {
        self.content
    }

    pub fn is_homing(&self) -> bool {
        self.homing
    }
}

impl Behavior for Item {
    fn update(&mut self, me: EntityId, world: &mut World) {
        let arena = world.arena();
        let Some(pos) = world.object(me).map(|o| o.pos) else {
            return;
        };
        if pos.y > arena.bottom() {
            world.delete_instance(me, RemoveReason::Dropped);
            return;
        }

        let target = world
            .find_instance::<Player>()
            .and_then(|p| world.object(p))
            .map(|o| o.pos);

        let Some(object) = world.object_mut(me) else {
            return;
        };
        object.pos.x = object.pos.x.clamp(arena.left(), arena.right());

        if target.is_some_and(|t| object.pos.distance(t) < HOMING_RANGE) {
            self.homing = true;
        }

        match target {
            Some(target) if self.homing => {
                let distance = object.pos.distance(target);
                object.vel = object.pos.direction_to_scaled(target, distance.min(HOMING_SPEED));
            }
            _ => object.vel.y = (object.vel.y + GRAVITY).min(FALL_SPEED),
        }
    }
}
