//! Shmup - a tick-driven arcade shoot-'em-up engine
//!
//! Core modules:
//! - `sim`: Engine core (geometry, colliders, entity registry, event bus, sequences, pooling)
//! - `game`: Shoot-'em-up content built on the engine (player, enemies, items, stage script)
//! - `settings`: Serializable session configuration
//! - `error`: Crate error type

pub mod error;
pub mod game;
pub mod settings;
pub mod sim;

pub use error::{EngineError, Result};
pub use settings::{RenderTarget, Settings};

/// Game configuration constants
pub mod consts {
    /// Default ticks per second
    pub const DEFAULT_TPS: f64 = 60.0;
    /// Allowed tick rate range
    pub const MIN_TPS: f64 = 1.0;
    pub const MAX_TPS: f64 = 1000.0;

    /// Default play area, in console cells
    pub const ARENA_LEFT: f64 = 1.0;
    pub const ARENA_TOP: f64 = 1.0;
    pub const ARENA_RIGHT: f64 = 59.0;
    pub const ARENA_BOTTOM: f64 = 23.0;

    /// Player bullets pre-registered per session
    pub const BULLET_POOL_SIZE: usize = 500;

    /// Layer assigned to objects that don't ask for one
    pub const DEFAULT_LAYER: u8 = 127;
}

/// Round to the nearest console cell.
///
/// Ties go to the even neighbour, so a value sitting exactly between two cells
/// snaps the same way on every axis.
#[inline]
pub fn round_cell(value: f64) -> f64 {
    value.round_ties_even()
}

/// Integer cell index of a coordinate
#[inline]
pub fn cell_index(value: f64) -> i64 {
    round_cell(value) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_cell_ties_to_even() {
        assert_eq!(round_cell(0.5), 0.0);
        assert_eq!(round_cell(1.5), 2.0);
        assert_eq!(round_cell(2.5), 2.0);
        assert_eq!(round_cell(-0.5), -0.0);
        assert_eq!(round_cell(2.6), 3.0);
    }

    #[test]
    fn test_cell_index() {
        assert_eq!(cell_index(3.49), 3);
        assert_eq!(cell_index(-1.6), -2);
    }
}
