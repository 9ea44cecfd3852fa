//! Per-type entity logic
//!
//! Every live entity is a [`GameObject`](super::object::GameObject) plus an
//! optional boxed [`Behavior`]. The registry hands the behavior its own id and
//! a mutable `World` on every call, so a behavior reads and writes its own
//! object through the world like any other entity.

use std::any::{Any, TypeId};

use super::events::{AddReason, Channel, GameEvent, RemoveReason};
use super::object::GameObject;
use super::world::{EntityId, World};

/// Runtime type tag used by typed registry queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    id: TypeId,
    name: &'static str,
}

impl Kind {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Type name without the module path
    pub fn name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

/// Downcasting support for boxed behaviors
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn kind(&self) -> Kind;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn kind(&self) -> Kind {
        Kind::of::<T>()
    }
}

/// An instance the added-channel reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Added {
    pub id: EntityId,
    pub kind: Kind,
}

/// An instance that just left the registry, with its final state
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub id: EntityId,
    pub kind: Kind,
    pub object: GameObject,
}

/// Logic attached to an entity
///
/// All hooks default to doing nothing.
pub trait Behavior: AsAny {
    /// Runs once per tick, after the object moved by its velocity
    fn update(&mut self, _me: EntityId, _world: &mut World) {}

    fn on_game_event(&mut self, _me: EntityId, _event: GameEvent, _world: &mut World) {}

    fn on_instance_added(&mut self, _me: EntityId, _added: Added, _reason: AddReason, _world: &mut World) {}

    fn on_instance_removed(
        &mut self,
        _me: EntityId,
        _removed: &Removed,
        _reason: RemoveReason,
        _world: &mut World,
    ) {
    }

    /// Channels subscribed right after the entity is added
    fn channels(&self) -> &'static [Channel] {
        &[]
    }
}
