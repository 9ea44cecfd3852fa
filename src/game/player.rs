//! The player ship and its pooled bullets
//!
//! Update order each tick:
//! 1. Clamp into the arena
//! 2. Shoot (every 4th tick)
//! 3. Pick up touching items
//! 4. Count down invulnerability
//! 5. Take damage, or graze nearby enemies
//! 6. Apply input
//!
//! Kill scoring doesn't involve enemies calling back into the player: the
//! player listens for instances removed with [`RemoveReason::Killed`].

use std::f64::consts::{FRAC_PI_2, PI};

use crate::sim::behavior::{Behavior, Removed};
use crate::sim::clock::Clock;
use crate::sim::collider::Collider;
use crate::sim::events::{AddReason, Channel, RemoveReason};
use crate::sim::input::GameButton;
use crate::sim::object::GameObject;
use crate::sim::pool::Pool;
use crate::sim::render::{Display, Sprite};
use crate::sim::vec::{DOWN, LEFT, RIGHT, UP, Vec2, Vec2Ext};
use crate::sim::world::{EntityId, World};

use super::enemy::{Enemy, EnemyBullet, damage_enemy};
use super::item::{Item, ItemKind};

pub const START_LIVES: i32 = 3;
pub const START_BOMBS: i32 = 3;
pub const START_VALUE: i64 = 1000;
pub const MIN_POWER: f64 = 1.0;
pub const MAX_POWER: f64 = 4.0;

/// Ticks between volleys
const SHOT_PERIOD: u64 = 4;
/// Enemies this close count as a graze
const GRAZE_RANGE: f64 = 2.5;
/// Two presses closer than this combine into a diagonal
const MULTIKEY_TICKS: u64 = 6;
/// Damage dealt by one player bullet
const BULLET_DAMAGE: i64 = 1;

fn ship_display(focused: bool) -> Display {
    let bottom = if focused { "/V#V\\" } else { "/W#W\\" };
    Display::new(Sprite::new(&[" ^^^ ", "<)O(>", bottom], true))
}

#[derive(Debug, Clone)]
pub struct Player {
    bullets: Pool,
    score: i64,
    lives: i32,
    bombs: i32,
    power: f64,
    value: i64,
    graze: i64,
    invulnerable: i64,
    focused: bool,
    /// Whichever look isn't on the object right now
    alt_display: Option<Display>,
}

impl Player {
    pub fn new(clock: &Clock, bullets: Pool) -> Self {
        Self {
            bullets,
            score: 0,
            lives: START_LIVES,
            bombs: START_BOMBS,
            power: MIN_POWER,
            value: START_VALUE,
            graze: 0,
            invulnerable: clock.seconds(1.0),
            focused: false,
            alt_display: Some(ship_display(true)),
        }
    }

    /// Register a bullet pool of `pool_size`, then the player itself
    pub fn spawn(world: &mut World, pos: Vec2, pool_size: usize) -> EntityId {
        let bullets = Pool::fill(world, pool_size, PlayerBullet::spawn);
        let object = GameObject::new(pos)
            .with_collider(Collider::dot())
            .with_display(ship_display(false));
        let player = Player::new(world.clock(), bullets);
        world.add_instance(object, player, AddReason::None)
    }

    pub fn score(&self) -> i64 {
        self.score * 10
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn bombs(&self) -> i32 {
        self.bombs
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn value(&self) -> i64 {
        self.value * 10
    }

    pub fn graze(&self) -> i64 {
        self.graze
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn invulnerable_ticks(&self) -> i64 {
        self.invulnerable
    }

    pub fn bullets(&self) -> &Pool {
        &self.bullets
    }

    /// Score a fraction of the current value plus a flat bonus
    pub fn add_score(&mut self, multiplier: f64, flat: i64) {
        self.score += (self.value as f64 * multiplier).round_ties_even() as i64 + flat;
        self.value += (multiplier * 10.0) as i64;
    }

    fn clamp_position(&self, me: EntityId, world: &mut World) {
        let arena = world.arena();
        if let Some(object) = world.object_mut(me) {
            object.pos = object.pos.clamped_into(arena.v1(), arena.v2());
        }
    }

    fn shoot(&mut self, me: EntityId, world: &mut World) {
        if self.invulnerable > world.clock().seconds(4.0) || world.ticks() % SHOT_PERIOD != 0 {
            return;
        }
        let Some(origin) = world.object(me).map(|o| o.pos.rounded()) else {
            return;
        };

        let pw = self.power.floor() as i32;
        let spread = PI * (f64::from(pw) - FRAC_PI_2) / (2.0 * f64::from(pw + 1));
        let h_offset = f64::from(pw - 1);

        for shot in 0..pw {
            let mut angle = -FRAC_PI_2;
            if pw > 1 {
                angle += spread * (f64::from(shot) / f64::from(pw - 1) - 0.5);
            }
            let pos = origin.offset(-h_offset / 2.0 + f64::from(shot), -2.0);
            self.bullets.fire(world, pos, Vec2::from_angle(angle), AddReason::Shoot);
        }
    }

    fn pick_items(&mut self, me: EntityId, world: &mut World) {
        for id in world.collisions_of::<Item>(me) {
            let Some(content) = world.behavior::<Item>(id).map(|i| i.content()) else {
                continue;
            };
            match content.kind {
                ItemKind::Power => {
                    self.power = (self.power + content.amount as f64 * 0.01).min(MAX_POWER);
                }
                ItemKind::Point => self.score += content.amount * self.value,
                ItemKind::Value => {
                    self.score += content.amount;
                    self.value += content.amount;
                }
            }
            world.delete_instance(id, RemoveReason::None);
        }
    }

    fn tick_invulnerability(&mut self, me: EntityId, world: &mut World) {
        if self.invulnerable <= 0 {
            return;
        }
        self.invulnerable -= 1;
        let blink_on = (self.invulnerable / 2) % 2 == 0;
        // Float up from the respawn point during the first second and a half
        let nudge = self.invulnerable > world.clock().seconds(3.5) && self.invulnerable % 20 == 0;

        if let Some(object) = world.object_mut(me) {
            object.set_visible(blink_on);
            if nudge {
                object.pos.y -= 1.0;
            }
        }
    }

    fn check_damage(&mut self, me: EntityId, world: &mut World) {
        let hit = world.collides_with::<Enemy>(me) || world.collides_with::<EnemyBullet>(me);
        if !hit {
            self.check_graze(me, world);
            return;
        }
        if self.invulnerable > 0 {
            return;
        }

        self.lives -= 1;
        self.bombs = START_BOMBS;
        self.power = (self.power - 1.0).max(MIN_POWER);
        self.set_focused(me, world, false);

        let arena = world.arena();
        if let Some(object) = world.object_mut(me) {
            object.pos = Vec2::new(arena.center().x, arena.bottom());
            object.vel = Vec2::ZERO;
        }
        self.invulnerable = world.clock().seconds(5.0);
        log::info!("Player hit at tick {}, {} lives left", world.ticks(), self.lives);

        if self.lives <= 0 {
            world.end();
        }
    }

    fn check_graze(&mut self, me: EntityId, world: &World) {
        let Some(pos) = world.object(me).map(|o| o.pos) else {
            return;
        };
        let near = world
            .find_instances::<Enemy>()
            .into_iter()
            .filter(|&id| world.object(id).is_some_and(|o| o.pos.distance(pos) <= GRAZE_RANGE))
            .count() as i64;
        self.value += near;
        self.graze += near;
    }

    fn handle_input(&mut self, me: EntityId, world: &mut World) {
        if self.invulnerable > world.clock().seconds(3.5) {
            return;
        }
        let input = *world.input();
        let Some(current) = input.current else {
            return;
        };
        let since_previous = current.tick.saturating_sub(input.previous.map_or(0, |p| p.tick));
        let multikey = since_previous < MULTIKEY_TICKS;

        let dir = match current.button {
            GameButton::Up => UP,
            GameButton::Down => DOWN,
            GameButton::Left => LEFT,
            GameButton::Right => RIGHT,
            GameButton::A => {
                if let Some(object) = world.object_mut(me) {
                    object.vel = Vec2::ZERO;
                }
                return;
            }
            GameButton::B => {
                if self.bombs > 0 {
                    self.bombs -= 1;
                }
                return;
            }
            GameButton::C => {
                self.toggle_focus(me, world);
                return;
            }
            GameButton::Escape => {
                log::info!("Player quit at tick {}", world.ticks());
                world.end();
                return;
            }
            GameButton::Start => return,
        };

        let mut factor = Vec2::new(1.0, 0.5);
        if self.focused {
            factor *= 0.5;
        }
        if let Some(object) = world.object_mut(me) {
            object.vel = if multikey && object.vel.dot(dir) == 0.0 {
                (dir + object.vel.sign()) * factor
            } else {
                dir * factor
            };
        }
    }

    fn toggle_focus(&mut self, me: EntityId, world: &mut World) {
        self.focused = !self.focused;
        let scale = if self.focused { 0.5 } else { 2.0 };
        if let Some(object) = world.object_mut(me) {
            object.vel *= scale;
            let visible = object.is_visible();
            std::mem::swap(&mut object.display, &mut self.alt_display);
            object.set_visible(visible);
        }
    }

    fn set_focused(&mut self, me: EntityId, world: &mut World, focused: bool) {
        if self.focused != focused {
            self.toggle_focus(me, world);
        }
    }
}

impl Behavior for Player {
    fn update(&mut self, me: EntityId, world: &mut World) {
        self.clamp_position(me, world);
        self.shoot(me, world);
        self.pick_items(me, world);
        self.tick_invulnerability(me, world);
        self.check_damage(me, world);
        self.handle_input(me, world);
    }

    fn on_instance_removed(&mut self, _me: EntityId, removed: &Removed, reason: RemoveReason, _world: &mut World) {
        if reason == RemoveReason::Killed && removed.kind.is::<Enemy>() {
            self.add_score(0.1, 10);
        }
    }

    fn channels(&self) -> &'static [Channel] {
        &[Channel::InstanceRemoved]
    }
}

/// Pooled player shot
///
/// Parks itself once it leaves the top of the screen or hits something.
/// Every enemy it touches in the same tick takes damage, one after another.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerBullet;

impl PlayerBullet {
    pub fn spawn(world: &mut World) -> EntityId {
        let object = GameObject::new(Vec2::ZERO)
            .with_collider(Collider::dot())
            .with_display(Display::glyph('o'));
        world.add_instance(object, PlayerBullet, AddReason::None)
    }
}

impl Behavior for PlayerBullet {
    fn update(&mut self, me: EntityId, world: &mut World) {
        if world.object(me).is_some_and(|o| o.pos.y < 0.0) {
            world.disable_instance(me, AddReason::None);
            return;
        }

        let hits = world.collisions_of::<Enemy>(me);
        if hits.is_empty() {
            return;
        }
        for enemy in hits {
            damage_enemy(world, enemy, BULLET_DAMAGE);
        }
        world.disable_instance(me, AddReason::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::enemy::{Grunt, Heavy};
    use crate::game::item::ItemContent;
    use crate::sim::input::{InputSource, NoInput, ScriptedInput};
    use crate::sim::render::NullRenderer;
    use crate::sim::sequence::Sequence;

    const START: Vec2 = Vec2::new(30.0, 20.0);

    fn step(world: &mut World) {
        world.tick(&mut NoInput, &mut NullRenderer::default());
    }

    fn step_with(world: &mut World, input: &mut dyn InputSource) {
        world.tick(input, &mut NullRenderer::default());
    }

    fn player(world: &World, id: EntityId) -> &Player {
        world.behavior::<Player>(id).expect("player should be registered")
    }

    fn player_mut(world: &mut World, id: EntityId) -> &mut Player {
        world.behavior_mut::<Player>(id).expect("player should be registered")
    }

    fn grunt_at(world: &mut World, pos: Vec2) -> EntityId {
        Enemy::spawn(world, pos, &Grunt, &Sequence::new(), AddReason::None)
    }

    #[test]
    fn test_starting_state() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 16);
        let p = player(&world, id);
        assert_eq!((p.lives(), p.bombs(), p.power()), (3, 3, 1.0));
        assert_eq!((p.score(), p.value(), p.graze()), (0, 10_000, 0));
        assert_eq!(p.invulnerable_ticks(), 60);
        assert_eq!(p.bullets().size(), 16);
        assert_eq!(world.live_count(), 1);
        assert_eq!(world.disabled_count(), 16);
    }

    #[test]
    fn test_shoots_every_fourth_tick() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 16);

        step(&mut world);
        let bullets = player(&world, id).bullets().clone();
        assert_eq!(bullets.active(&world), 1);
        let shot = bullets.members()[0];
        let (pos, vel) = world.object(shot).map(|o| (o.pos, o.vel)).unwrap_or_default();
        assert_eq!(pos, Vec2::new(30.0, 18.0));
        assert!((vel - UP).length() < 1e-9);

        for _ in 0..3 {
            step(&mut world);
        }
        assert_eq!(bullets.active(&world), 1);
        step(&mut world);
        assert_eq!(bullets.active(&world), 2);
    }

    #[test]
    fn test_higher_power_fans_out() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 16);
        player_mut(&mut world, id).power = 2.5;

        step(&mut world);
        let bullets = player(&world, id).bullets().clone();
        assert_eq!(bullets.active(&world), 2);
        let left = world.object(bullets.members()[0]).map(|o| (o.pos, o.vel)).unwrap_or_default();
        let right = world.object(bullets.members()[1]).map(|o| (o.pos, o.vel)).unwrap_or_default();
        assert_eq!(left.0, Vec2::new(29.5, 18.0));
        assert_eq!(right.0, Vec2::new(30.5, 18.0));
        assert!(left.1.x < 0.0 && right.1.x > 0.0);
        assert!((left.1.x + right.1.x).abs() < 1e-9);
    }

    #[test]
    fn test_no_shots_right_after_respawn() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 16);
        player_mut(&mut world, id).invulnerable = 300;
        step(&mut world);
        assert_eq!(player(&world, id).bullets().active(&world), 0);
    }

    #[test]
    fn test_picks_up_items() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let point = Item::spawn(&mut world, START, ItemContent::new(ItemKind::Point, 3), AddReason::None);
        let power = Item::spawn(&mut world, START, ItemContent::new(ItemKind::Power, 5), AddReason::None);
        let value = Item::spawn(&mut world, START, ItemContent::new(ItemKind::Value, 2), AddReason::None);

        step(&mut world);
        let p = player(&world, id);
        assert_eq!(p.score(), (3 * 1000 + 2) * 10);
        assert_eq!(p.value(), 1002 * 10);
        assert!((p.power() - 1.05).abs() < 1e-9);
        assert!(!world.contains(point) && !world.contains(power) && !world.contains(value));
    }

    #[test]
    fn test_power_caps_at_four() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        Item::spawn(&mut world, START, ItemContent::new(ItemKind::Power, 1000), AddReason::None);
        step(&mut world);
        assert_eq!(player(&world, id).power(), MAX_POWER);
    }

    #[test]
    fn test_enemy_kill_scores() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let enemy = grunt_at(&mut world, Vec2::new(5.0, 3.0));
        assert_eq!(damage_enemy(&mut world, enemy, 1), Some(true));

        let p = player(&world, id);
        assert_eq!(p.score(), (100 + 10) * 10);
        assert_eq!(p.value(), 1001 * 10);
    }

    #[test]
    fn test_despawned_enemy_does_not_score() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let enemy = grunt_at(&mut world, Vec2::new(5.0, 3.0));
        world.delete_instance(enemy, RemoveReason::None);
        assert_eq!(player(&world, id).score(), 0);
    }

    #[test]
    fn test_hit_costs_a_life_and_respawns() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        player_mut(&mut world, id).invulnerable = 0;
        player_mut(&mut world, id).power = 2.5;
        player_mut(&mut world, id).bombs = 0;
        grunt_at(&mut world, START);

        step(&mut world);
        let p = player(&world, id);
        assert_eq!(p.lives(), 2);
        assert_eq!(p.bombs(), 3);
        assert!((p.power() - 1.5).abs() < 1e-9);
        assert_eq!(p.invulnerable_ticks(), 300);
        let arena = world.arena();
        assert_eq!(world.object(id).map(|o| o.pos), Some(Vec2::new(arena.center().x, arena.bottom())));
        assert!(!world.ended());
    }

    #[test]
    fn test_invulnerable_player_ignores_hits() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        EnemyBullet::spawn(&mut world, START, Vec2::ZERO, AddReason::None);
        step(&mut world);
        assert_eq!(player(&world, id).lives(), 3);
    }

    #[test]
    fn test_last_life_ends_the_game() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        player_mut(&mut world, id).invulnerable = 0;
        player_mut(&mut world, id).lives = 1;
        EnemyBullet::spawn(&mut world, START, Vec2::ZERO, AddReason::None);

        step(&mut world);
        assert_eq!(player(&world, id).lives(), 0);
        assert!(world.ended());
    }

    #[test]
    fn test_graze_counts_close_enemies() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        grunt_at(&mut world, START + Vec2::new(2.0, 0.0));
        grunt_at(&mut world, START + Vec2::new(0.0, 5.0));

        step(&mut world);
        let p = player(&world, id);
        assert_eq!(p.graze(), 1);
        assert_eq!(p.value(), 1001 * 10);
        assert_eq!(p.lives(), 3);
    }

    #[test]
    fn test_invulnerability_blinks() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let mut seen = Vec::new();
        for _ in 0..4 {
            step(&mut world);
            seen.push(world.object(id).is_some_and(|o| o.is_visible()));
        }
        // 59 and 58 -> 29 (odd), 57 and 56 -> 28 (even)
        assert_eq!(seen, vec![false, false, true, true]);
    }

    #[test]
    fn test_input_moves_and_combines() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let mut input = ScriptedInput::new()
            .press(0, GameButton::Right)
            .press(1, GameButton::Up)
            .press(2, GameButton::C)
            .press(3, GameButton::A)
            .press(4, GameButton::B)
            .press(5, GameButton::Escape);

        step_with(&mut world, &mut input);
        assert_eq!(world.object(id).map(|o| o.vel), Some(Vec2::new(1.0, 0.0)));

        step_with(&mut world, &mut input);
        assert_eq!(world.object(id).map(|o| o.vel), Some(Vec2::new(1.0, -0.5)));

        step_with(&mut world, &mut input);
        assert!(player(&world, id).is_focused());
        assert_eq!(world.object(id).map(|o| o.vel), Some(Vec2::new(0.5, -0.25)));
        let focused_look = world
            .object(id)
            .and_then(|o| o.display.as_ref())
            .map(|d| d.sprite.clone());
        assert_eq!(focused_look, Some(ship_display(true).sprite));

        step_with(&mut world, &mut input);
        assert_eq!(world.object(id).map(|o| o.vel), Some(Vec2::ZERO));

        step_with(&mut world, &mut input);
        assert_eq!(player(&world, id).bombs(), 2);
        assert!(!world.ended());

        step_with(&mut world, &mut input);
        assert!(world.ended());
    }

    #[test]
    fn test_focused_movement_is_slower() {
        let mut world = World::default();
        let id = Player::spawn(&mut world, START, 0);
        let mut input = ScriptedInput::new().press(0, GameButton::C).press(10, GameButton::Down);
        for _ in 0..11 {
            step_with(&mut world, &mut input);
        }
        assert_eq!(world.object(id).map(|o| o.vel), Some(Vec2::new(0.0, 0.25)));
    }

    #[test]
    fn test_bullet_damages_every_enemy_it_touches() {
        let mut world = World::default();
        let mut pool = Pool::fill(&mut world, 4, PlayerBullet::spawn);
        let target = Vec2::new(20.0, 10.0);
        let a = grunt_at(&mut world, target);
        let b = grunt_at(&mut world, target);
        let heavy = Enemy::spawn(&mut world, target, &Heavy, &Sequence::new(), AddReason::None);

        let shot = pool.fire(&mut world, target, Vec2::ZERO, AddReason::Shoot);
        step(&mut world);

        assert!(!world.contains(a) && !world.contains(b));
        assert_eq!(world.behavior::<Enemy>(heavy).map(|e| e.hp()), Some(9));
        assert!(shot.is_some_and(|s| world.is_disabled(s)));
    }

    #[test]
    fn test_bullet_parks_above_screen() {
        let mut world = World::default();
        let mut pool = Pool::fill(&mut world, 1, PlayerBullet::spawn);
        let shot = pool.fire(&mut world, Vec2::new(10.0, 0.5), UP, AddReason::Shoot);
        assert!(shot.is_some_and(|s| world.is_live(s)));
        step(&mut world);
        assert!(shot.is_some_and(|s| world.is_disabled(s)));
        assert_eq!(pool.active(&world), 0);
    }
}
