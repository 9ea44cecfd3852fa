//! Ring-buffer entity pool
//!
//! Every member is registered once up front and parked right away. Firing
//! takes the next member in ring order, moves it into place and enables it;
//! releasing parks it again. Nothing is added to or deleted from the registry
//! after construction.

use super::events::AddReason;
use super::vec::Vec2;
use super::world::{EntityId, World};

#[derive(Debug, Clone, Default)]
pub struct Pool {
    members: Vec<EntityId>,
    next: usize,
}

impl Pool {
    /// Register `size` members built by `make`, parking each one
    pub fn fill(world: &mut World, size: usize, mut make: impl FnMut(&mut World) -> EntityId) -> Self {
        let mut members = Vec::with_capacity(size);
        for _ in 0..size {
            let id = make(world);
            world.disable_instance(id, AddReason::None);
            members.push(id);
        }
        log::debug!("Pool filled with {} members", members.len());
        Self { members, next: 0 }
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Ring position of a member
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.members.iter().position(|&m| m == id)
    }

    /// Next member in ring order, wrapping after the last
    ///
    /// The member may still be live; it gets reused regardless.
    pub fn acquire(&mut self) -> Option<EntityId> {
        let id = *self.members.get(self.next)?;
        self.next = (self.next + 1) % self.members.len();
        Some(id)
    }

    /// Acquire a member, place it and bring it live
    pub fn fire(&mut self, world: &mut World, pos: Vec2, vel: Vec2, reason: AddReason) -> Option<EntityId> {
        let id = self.acquire()?;
        if let Some(object) = world.object_mut(id) {
            object.pos = pos;
            object.vel = vel;
        }
        world.enable_instance(id, reason);
        Some(id)
    }

    /// Park a member; false for ids that don't belong to this pool
    pub fn release(&self, world: &mut World, id: EntityId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        world.disable_instance(id, AddReason::None)
    }

    /// Members currently live
    pub fn active(&self, world: &World) -> usize {
        self.members.iter().filter(|&&m| world.is_live(m)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::object::GameObject;

    fn pool(world: &mut World, size: usize) -> Pool {
        Pool::fill(world, size, |w| w.add_object(GameObject::default(), AddReason::None))
    }

    #[test]
    fn test_members_start_parked() {
        let mut world = World::default();
        let pool = pool(&mut world, 8);
        assert_eq!(pool.size(), 8);
        assert_eq!(world.live_count(), 0);
        assert_eq!(world.disabled_count(), 8);
        assert_eq!(pool.active(&world), 0);
    }

    #[test]
    fn test_wraps_around_after_last_member() {
        let mut world = World::default();
        let mut pool = pool(&mut world, 500);
        let first = pool.members()[0];

        let mut last = None;
        for i in 0..501 {
            let pos = Vec2::new(i as f64, 0.0);
            last = pool.fire(&mut world, pos, Vec2::new(0.0, -1.0 - i as f64), AddReason::Shoot);
        }

        assert_eq!(last, Some(first));
        assert_eq!(pool.index_of(first), Some(0));
        let obj = world.object(first).map(|o| (o.pos, o.vel));
        assert_eq!(obj, Some((Vec2::new(500.0, 0.0), Vec2::new(0.0, -501.0))));
        assert_eq!(pool.active(&world), 500);
    }

    #[test]
    fn test_release_parks_member() {
        let mut world = World::default();
        let mut pool = pool(&mut world, 2);
        let id = pool.fire(&mut world, Vec2::ONE, Vec2::ZERO, AddReason::Shoot);
        let Some(id) = id else {
            panic!("pool should hand out a member");
        };
        assert!(world.is_live(id));
        assert!(pool.release(&mut world, id));
        assert!(world.is_disabled(id));
        assert!(!pool.release(&mut world, id));

        let stranger = world.add_object(GameObject::default(), AddReason::None);
        assert!(!pool.release(&mut world, stranger));
        assert!(world.is_live(stranger));
    }

    #[test]
    fn test_empty_pool_hands_out_nothing() {
        let mut world = World::default();
        let mut pool = pool(&mut world, 0);
        assert_eq!(pool.acquire(), None);
        assert_eq!(pool.fire(&mut world, Vec2::ZERO, Vec2::ZERO, AddReason::Shoot), None);
    }
}
