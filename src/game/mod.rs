//! Shoot-'em-up content built on the engine
//!
//! Everything here goes through the public `World` API: typed queries,
//! collision checks, event channels and sequences.

pub mod enemy;
pub mod item;
pub mod player;
pub mod spawner;
pub mod stage;

pub use enemy::{Enemy, EnemyBullet, EnemyShot, Grunt, Heavy, Recipe, Skimmer};
pub use item::{Item, ItemContent, ItemKind};
pub use player::{Player, PlayerBullet};
pub use spawner::Spawner;
pub use stage::{StageSequencer, stage_one};

use crate::error::Result;
use crate::settings::Settings;
use crate::sim::vec::Vec2;
use crate::sim::world::{EntityId, World};

/// Rows between the arena floor and the player's starting spot
const PLAYER_START_LIFT: f64 = 6.0;

/// Reset `world` and set up stage one with a fresh player
///
/// Returns the player's id. The stage is built before anything is registered,
/// so a clock too slow for the authored waves leaves the world untouched.
pub fn start_stage_one(world: &mut World, settings: &Settings) -> Result<EntityId> {
    let spawners = stage_one(world.clock(), world.arena())?;

    world.clear_state();
    let arena = world.arena();
    let start = Vec2::new(arena.center().x, arena.bottom() - PLAYER_START_LIFT);
    let player = Player::spawn(world, start, settings.bullet_pool_size);
    StageSequencer::spawn(world, spawners);
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::input::NoInput;
    use crate::sim::render::NullRenderer;

    #[test]
    fn test_start_stage_one() {
        let settings = Settings::default();
        let mut world = World::from_settings(&settings);
        let player = start_stage_one(&mut world, &settings).unwrap();

        assert_eq!(world.object(player).map(|o| o.pos), Some(Vec2::new(30.0, 17.0)));
        assert_eq!(world.disabled_count(), settings.bullet_pool_size);
        assert!(world.instance_exists::<StageSequencer>());

        world.tick(&mut NoInput, &mut NullRenderer::default());
        assert_eq!(world.find_instances::<Enemy>().len(), 1);
    }

    #[test]
    fn test_slow_clock_leaves_world_alone() {
        let settings = Settings {
            ticks_per_second: 1.0,
            ..Settings::default()
        };
        let mut world = World::from_settings(&settings);
        let marker = world.add_object(Default::default(), Default::default());
        assert!(start_stage_one(&mut world, &settings).is_err());
        assert!(world.is_live(marker));
    }
}
