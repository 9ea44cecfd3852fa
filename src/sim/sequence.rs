//! Tick-scripted behavior programs
//!
//! A [`Sequence`] is a list of steps keyed by local tick plus a cursor. Each
//! [`Sequence::follow`] call looks up the step for the cursor, moves the
//! cursor forward by one, then applies the step to its owner. Ticks without a
//! step are plain advances.
//!
//! Repeat steps loop by rewinding the cursor of the sequence that holds them.
//! Because the cursor has already moved past the repeat when it fires, the
//! rewind distance is `|cursor - target| + 1`, floored at tick 0.

use std::fmt;
use std::rc::Rc;

use super::events::{AddReason, RemoveReason};
use super::vec::Vec2;
use super::world::{EntityId, World};

/// Something a sequence can put into the world
pub trait Spawnable {
    /// Register a new instance at `origin`
    fn spawn(&self, origin: Vec2, reason: AddReason, world: &mut World) -> EntityId;
}

/// Shared handle to a spawnable template
#[derive(Clone)]
pub struct Prefab(Rc<dyn Spawnable>);

impl Prefab {
    pub fn new(spawnable: impl Spawnable + 'static) -> Self {
        Self(Rc::new(spawnable))
    }

    pub fn spawn(&self, origin: Vec2, reason: AddReason, world: &mut World) -> EntityId {
        self.0.spawn(origin, reason, world)
    }
}

impl PartialEq for Prefab {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Prefab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Prefab(..)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Overwrite the owner's velocity
    Velocity(Vec2),
    /// Add a new instance at the owner's position
    Spawn { prefab: Prefab, reason: AddReason },
    /// Remove the owner
    Kill { reason: RemoveReason },
    /// Jump back toward `target`; `remaining: None` repeats forever
    Repeat { target: u64, remaining: Option<u32> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStep {
    pub tick: u64,
    pub action: StepAction,
}

impl SequenceStep {
    pub fn velocity(tick: u64, vel: Vec2) -> Self {
        Self {
            tick,
            action: StepAction::Velocity(vel),
        }
    }

    pub fn spawn(tick: u64, prefab: Prefab, reason: AddReason) -> Self {
        Self {
            tick,
            action: StepAction::Spawn { prefab, reason },
        }
    }

    pub fn kill(tick: u64, reason: RemoveReason) -> Self {
        Self {
            tick,
            action: StepAction::Kill { reason },
        }
    }

    /// Repeat step; a negative target counts as its absolute value
    pub fn repeat(tick: u64, target: i64, times: Option<u32>) -> Self {
        Self {
            tick,
            action: StepAction::Repeat {
                target: target.unsigned_abs(),
                remaining: times,
            },
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct Sequence {
    steps: Vec<SequenceStep>,
    cursor: u64,
}

/// Cloning copies the steps (repeat counters included) and starts the copy
/// from tick 0, ready for a new owner.
impl Clone for Sequence {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            cursor: 0,
        }
    }
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steps(steps: impl IntoIterator<Item = SequenceStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            cursor: 0,
        }
    }

    pub fn add_step(&mut self, step: SequenceStep) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn add_steps(&mut self, steps: impl IntoIterator<Item = SequenceStep>) -> &mut Self {
        self.steps.extend(steps);
        self
    }

    /// Local tick the next `follow` will run
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn index_at(&self, tick: u64) -> Option<usize> {
        self.steps.iter().position(|s| s.tick == tick)
    }

    /// First step scheduled at `tick`
    pub fn step_at(&self, tick: u64) -> Option<&SequenceStep> {
        self.index_at(tick).map(|i| &self.steps[i])
    }

    pub fn current(&self) -> Option<&SequenceStep> {
        self.step_at(self.cursor)
    }

    pub fn next(&self, n: u64) -> Option<&SequenceStep> {
        self.step_at(self.cursor.saturating_add(n))
    }

    pub fn previous(&self, n: u64) -> Option<&SequenceStep> {
        self.step_at(self.cursor.saturating_sub(n))
    }

    /// Move the cursor forward without firing anything; returns the step it left
    pub fn advance(&mut self, n: u64) -> Option<&SequenceStep> {
        let index = self.index_at(self.cursor);
        self.cursor = self.cursor.saturating_add(n);
        index.map(|i| &self.steps[i])
    }

    /// Move the cursor back, never below 0; returns the step it left
    pub fn rewind(&mut self, n: u64) -> Option<&SequenceStep> {
        let index = self.index_at(self.cursor);
        self.cursor = self.cursor.saturating_sub(n);
        index.map(|i| &self.steps[i])
    }

    /// Run one tick of the program against `owner`
    pub fn follow(&mut self, owner: EntityId, world: &mut World) {
        let index = self.index_at(self.cursor);
        self.cursor = self.cursor.saturating_add(1);
        let Some(index) = index else {
            return;
        };

        let mut rewind_by = None;
        match &mut self.steps[index].action {
            StepAction::Velocity(vel) => {
                if let Some(object) = world.object_mut(owner) {
                    object.vel = *vel;
                }
            }
            StepAction::Spawn { prefab, reason } => {
                if let Some(origin) = world.object(owner).map(|o| o.pos) {
                    prefab.spawn(origin, *reason, world);
                }
            }
            StepAction::Kill { reason } => {
                world.delete_instance(owner, *reason);
            }
            StepAction::Repeat { target, remaining } => {
                let go = match remaining {
                    Some(0) => false,
                    Some(n) => {
                        *n -= 1;
                        true
                    }
                    None => true,
                };
                if go {
                    rewind_by = Some(self.cursor.abs_diff(*target) + 1);
                }
            }
        }

        if let Some(n) = rewind_by {
            self.rewind(n);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::behavior::{Added, Behavior};
    use crate::sim::events::Channel;
    use crate::sim::object::GameObject;

    fn owner(world: &mut World) -> EntityId {
        world.add_object(GameObject::default(), AddReason::None)
    }

    /// Follows `seq` for `ticks` ticks, counting how often the velocity got set
    fn count_velocity_changes(seq: &mut Sequence, ticks: usize) -> usize {
        let mut world = World::default();
        let me = owner(&mut world);
        let mut fired = 0;
        for _ in 0..ticks {
            seq.follow(me, &mut world);
            if let Some(obj) = world.object_mut(me) {
                if obj.vel != Vec2::ZERO {
                    fired += 1;
                    obj.vel = Vec2::ZERO;
                }
            }
        }
        fired
    }

    #[test]
    fn test_repeat_scenario() {
        let mut seq = Sequence::with_steps([
            SequenceStep::velocity(0, Vec2::new(1.0, 0.0)),
            SequenceStep::repeat(5, 0, Some(2)),
        ]);
        assert_eq!(count_velocity_changes(&mut seq, 18), 3);
        // Third pass ran past the exhausted repeat
        assert_eq!(seq.cursor(), 6);
        assert_eq!(
            seq.step_at(5).map(|s| &s.action),
            Some(&StepAction::Repeat { target: 0, remaining: Some(0) })
        );
        assert_eq!(count_velocity_changes(&mut seq, 30), 0);
    }

    #[test]
    fn test_repeat_lands_one_before_target() {
        let mut seq = Sequence::with_steps([SequenceStep::repeat(7, 3, Some(1))]);
        let mut world = World::default();
        let me = owner(&mut world);
        for _ in 0..8 {
            seq.follow(me, &mut world);
        }
        // cursor was 8 when the repeat fired: 8 - (|8 - 3| + 1) = 2
        assert_eq!(seq.cursor(), 2);
    }

    #[test]
    fn test_unbounded_repeat_keeps_looping() {
        let mut seq = Sequence::with_steps([
            SequenceStep::velocity(0, Vec2::new(0.0, 1.0)),
            SequenceStep::repeat(1, 0, None),
        ]);
        assert_eq!(count_velocity_changes(&mut seq, 20), 10);
    }

    #[test]
    fn test_negative_target_is_normalized() {
        let step = SequenceStep::repeat(9, -4, Some(1));
        assert_eq!(step.action, StepAction::Repeat { target: 4, remaining: Some(1) });
    }

    #[test]
    fn test_clone_resets_cursor_and_is_independent() {
        let mut original = Sequence::with_steps([
            SequenceStep::velocity(0, Vec2::new(1.0, 0.0)),
            SequenceStep::repeat(2, 0, Some(3)),
        ]);
        original.advance(2);
        assert_eq!(original.cursor(), 2);

        let mut copy = original.clone();
        assert_eq!(copy.cursor(), 0);
        assert_eq!(copy.steps(), original.steps());

        // Exhaust the copy's repeat counter
        count_velocity_changes(&mut copy, 12);
        assert_eq!(
            copy.step_at(2).map(|s| &s.action),
            Some(&StepAction::Repeat { target: 0, remaining: Some(0) })
        );
        assert_eq!(
            original.step_at(2).map(|s| &s.action),
            Some(&StepAction::Repeat { target: 0, remaining: Some(3) })
        );
    }

    #[test]
    fn test_cursor_moves() {
        let mut seq = Sequence::with_steps([
            SequenceStep::velocity(0, Vec2::ONE),
            SequenceStep::velocity(3, Vec2::ZERO),
        ]);
        assert_eq!(seq.current().map(|s| s.tick), Some(0));
        assert_eq!(seq.next(3).map(|s| s.tick), Some(3));

        let left = seq.advance(3).map(|s| s.tick);
        assert_eq!(left, Some(0));
        assert_eq!(seq.previous(3).map(|s| s.tick), Some(0));
        assert_eq!(seq.previous(10).map(|s| s.tick), Some(0));

        let left = seq.rewind(10).map(|s| s.tick);
        assert_eq!(left, Some(3));
        assert_eq!(seq.cursor(), 0);
        assert!(seq.step_at(1).is_none());
    }

    #[test]
    fn test_follow_at_cursor_ceiling() {
        let mut world = World::default();
        let me = owner(&mut world);
        let mut seq = Sequence::with_steps([SequenceStep::velocity(0, Vec2::ONE)]);
        seq.advance(u64::MAX);
        seq.follow(me, &mut world);
        seq.follow(me, &mut world);
        assert_eq!(seq.cursor(), u64::MAX);
        assert_eq!(world.object(me).map(|o| o.vel), Some(Vec2::ZERO));
    }

    #[test]
    fn test_kill_step_removes_owner() {
        let mut world = World::default();
        let me = owner(&mut world);
        let mut seq = Sequence::with_steps([SequenceStep::kill(1, RemoveReason::Died)]);
        seq.follow(me, &mut world);
        assert!(world.is_live(me));
        seq.follow(me, &mut world);
        assert!(!world.contains(me));
        // Following a dead owner is harmless
        seq.follow(me, &mut world);
    }

    struct Marker;

    impl Spawnable for Marker {
        fn spawn(&self, origin: Vec2, reason: AddReason, world: &mut World) -> EntityId {
            world.add_object(GameObject::new(origin), reason)
        }
    }

    #[test]
    fn test_spawn_step_uses_owner_position() {
        let mut world = World::default();
        let me = world.add_object(GameObject::new(Vec2::new(4.0, 2.0)), AddReason::None);
        let mut seq = Sequence::new();
        seq.add_step(SequenceStep::spawn(0, Prefab::new(Marker), AddReason::Shoot));
        seq.follow(me, &mut world);

        assert_eq!(world.live_count(), 2);
        let spawned = world.live()[1];
        assert_eq!(world.object(spawned).map(|o| o.pos), Some(Vec2::new(4.0, 2.0)));
    }

    /// Records the reason of every addition it hears about
    struct Watcher(Rc<std::cell::RefCell<Vec<(EntityId, AddReason)>>>);

    impl Behavior for Watcher {
        fn on_instance_added(&mut self, _me: EntityId, added: Added, reason: AddReason, _world: &mut World) {
            self.0.borrow_mut().push((added.id, reason));
        }

        fn channels(&self) -> &'static [Channel] {
            &[Channel::InstanceAdded]
        }
    }

    #[test]
    fn test_spawn_step_reason_reaches_listeners() {
        let mut world = World::default();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        world.add_instance(GameObject::default(), Watcher(seen.clone()), AddReason::None);
        let me = world.add_object(GameObject::new(Vec2::new(4.0, 2.0)), AddReason::None);
        seen.borrow_mut().clear();

        let mut seq = Sequence::with_steps([SequenceStep::spawn(0, Prefab::new(Marker), AddReason::Shoot)]);
        seq.follow(me, &mut world);

        let spawned = world.live()[2];
        assert_eq!(*seen.borrow(), vec![(spawned, AddReason::Shoot)]);
    }
}
