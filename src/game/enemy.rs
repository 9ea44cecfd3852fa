//! Enemies and their shots
//!
//! An [`Enemy`] is driven entirely by its own copy of a [`Sequence`]. What it
//! looks like, how much it takes to kill and what it drops come from a
//! [`Recipe`].

use rand::Rng;

use crate::sim::behavior::Behavior;
use crate::sim::collider::Collider;
use crate::sim::events::{AddReason, RemoveReason};
use crate::sim::object::GameObject;
use crate::sim::rect::Rect;
use crate::sim::render::{Display, Sprite};
use crate::sim::sequence::{Sequence, Spawnable};
use crate::sim::vec::Vec2;
use crate::sim::world::{EntityId, World};

use super::item::{Item, ItemContent, ItemKind};

/// Species description for an enemy
pub trait Recipe {
    fn hp(&self) -> i64;
    fn power_items(&self) -> i64;
    fn point_items(&self) -> i64;
    fn display(&self) -> Display;
    fn collider(&self) -> Collider;
}

/// Single-cell popcorn enemy
#[derive(Debug, Clone, Copy, Default)]
pub struct Grunt;

impl Recipe for Grunt {
    fn hp(&self) -> i64 {
        1
    }

    fn power_items(&self) -> i64 {
        1
    }

    fn point_items(&self) -> i64 {
        1
    }

    fn display(&self) -> Display {
        Display::glyph('X')
    }

    fn collider(&self) -> Collider {
        Collider::dot()
    }
}

/// 3x3 tank that drops a lot of loot
#[derive(Debug, Clone, Copy, Default)]
pub struct Heavy;

impl Recipe for Heavy {
    fn hp(&self) -> i64 {
        10
    }

    fn power_items(&self) -> i64 {
        32
    }

    fn point_items(&self) -> i64 {
        16
    }

    fn display(&self) -> Display {
        Display::new(Sprite::new(&["WWW", "(O)", "\\_/"], true))
    }

    fn collider(&self) -> Collider {
        Collider::rect(Rect::from_coords(-1.0, -1.0, 1.0, 1.0))
    }
}

/// 3x2 mid-weight enemy
#[derive(Debug, Clone, Copy, Default)]
pub struct Skimmer;

impl Recipe for Skimmer {
    fn hp(&self) -> i64 {
        6
    }

    fn power_items(&self) -> i64 {
        3
    }

    fn point_items(&self) -> i64 {
        4
    }

    fn display(&self) -> Display {
        Display::new(Sprite::new(&["<O>", "¡¡¡"], true))
    }

    fn collider(&self) -> Collider {
        Collider::rect(Rect::from_coords(-1.0, -1.0, 1.0, 0.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    hp: i64,
    power_items: i64,
    point_items: i64,
    sequence: Sequence,
}

impl Enemy {
    /// Build from a recipe; the sequence is cloned and starts at tick 0
    pub fn new(recipe: &dyn Recipe, sequence: &Sequence) -> Self {
        Self {
            hp: recipe.hp(),
            power_items: recipe.power_items(),
            point_items: recipe.point_items(),
            sequence: sequence.clone(),
        }
    }

    pub fn spawn(
        world: &mut World,
        pos: Vec2,
        recipe: &dyn Recipe,
        sequence: &Sequence,
        reason: AddReason,
    ) -> EntityId {
        let object = GameObject::new(pos)
            .with_collider(recipe.collider())
            .with_display(recipe.display());
        world.add_instance(object, Enemy::new(recipe, sequence), reason)
    }

    pub fn hp(&self) -> i64 {
        self.hp
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Take `amount` damage (sign ignored); returns true if this killed it
    ///
    /// A kill removes the enemy with [`RemoveReason::Killed`] and scatters its
    /// loot around the spot where it died.
    pub fn damage(&mut self, me: EntityId, amount: i64, world: &mut World) -> bool {
        self.hp -= amount.abs();
        if self.hp > 0 {
            return false;
        }
        let Some(pos) = world.object(me).map(|o| o.pos) else {
            return false;
        };
        if !world.delete_instance(me, RemoveReason::Killed) {
            return false;
        }
        log::debug!("Enemy {} killed at ({:.1}, {:.1})", me, pos.x, pos.y);
        burst_items(world, pos, ItemContent::new(ItemKind::Power, self.power_items));
        burst_items(world, pos, ItemContent::new(ItemKind::Point, self.point_items));
        true
    }
}

impl Behavior for Enemy {
    fn update(&mut self, me: EntityId, world: &mut World) {
        self.sequence.follow(me, world);
    }
}

/// Damage a registered enemy; `None` if `id` is not an enemy that can be
/// reached right now
pub fn damage_enemy(world: &mut World, id: EntityId, amount: i64) -> Option<bool> {
    world.with_behavior::<Enemy, _>(id, |enemy, world| enemy.damage(id, amount, world))
}

/// Scatter `content` as a handful of items around `origin`
///
/// Bigger drops scatter wider. Each item carries a random share of what is
/// left, so the number of items varies.
pub fn burst_items(world: &mut World, origin: Vec2, mut content: ItemContent) -> usize {
    let amount = content.amount;
    if amount <= 0 {
        return 0;
    }
    let spread = (2 * amount / (amount + 1) + (amount - 1) / 8) as f64;

    let mut spawned = 0;
    while !content.is_empty() {
        let rng = world.rng();
        let share = content.take(rng.random_range(1..=amount));
        let offset = random_unit_square(rng) * spread;
        Item::spawn(world, origin + offset, share, AddReason::Related);
        spawned += 1;
    }
    spawned
}

/// Point in the square spanned by (-1, -1) and (1, 1)
fn random_unit_square(rng: &mut impl Rng) -> Vec2 {
    let mut component = || {
        let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        rng.random::<f64>() * sign
    };
    let x = component();
    let y = component();
    Vec2::new(x, y)
}

/// How far past the arena edge an enemy shot survives
const OFFSCREEN_MARGIN: f64 = 2.0;

/// Shot fired by enemies; hurts the player on contact
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyBullet;

impl EnemyBullet {
    pub fn spawn(world: &mut World, pos: Vec2, vel: Vec2, reason: AddReason) -> EntityId {
        let object = GameObject::new(pos)
            .with_velocity(vel)
            .with_collider(Collider::dot())
            .with_display(Display::glyph('*'));
        world.add_instance(object, EnemyBullet, reason)
    }
}

impl Behavior for EnemyBullet {
    fn update(&mut self, me: EntityId, world: &mut World) {
        let arena = world.arena();
        let bounds = Rect::new(
            arena.v1() - Vec2::splat(OFFSCREEN_MARGIN),
            arena.v2() + Vec2::splat(OFFSCREEN_MARGIN),
        );
        if world.object(me).is_some_and(|o| !bounds.contains(o.pos)) {
            world.delete_instance(me, RemoveReason::Dropped);
        }
    }
}

/// Sequence-spawnable enemy shot with a fixed velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyShot {
    pub vel: Vec2,
}

impl Spawnable for EnemyShot {
    fn spawn(&self, origin: Vec2, reason: AddReason, world: &mut World) -> EntityId {
        EnemyBullet::spawn(world, origin, self.vel, reason)
    }
}
