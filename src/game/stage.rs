//! Stage scripting
//!
//! A stage is a list of [`Spawner`]s built once up front. The
//! [`StageSequencer`] entity polls all of them after every entity update and
//! announces [`GameEvent::StageFinished`] once nothing is left to spawn and no
//! enemy is alive. With only one stage authored, finishing it ends the run.

use crate::error::Result;
use crate::sim::behavior::Behavior;
use crate::sim::clock::Clock;
use crate::sim::events::{AddReason, Channel, GameEvent, RemoveReason};
use crate::sim::object::GameObject;
use crate::sim::rect::Rect;
use crate::sim::sequence::{Sequence, SequenceStep};
use crate::sim::vec::{DOWN, LEFT, RIGHT, UP, Vec2};
use crate::sim::world::{EntityId, World};

use super::enemy::{Enemy, Grunt, Heavy, Skimmer};
use super::spawner::Spawner;

#[derive(Debug)]
pub struct StageSequencer {
    spawners: Vec<Spawner>,
    finished: bool,
}

impl StageSequencer {
    pub fn new(spawners: Vec<Spawner>) -> Self {
        Self {
            spawners,
            finished: false,
        }
    }

    pub fn spawn(world: &mut World, spawners: Vec<Spawner>) -> EntityId {
        log::info!("Stage loaded with {} spawners", spawners.len());
        world.add_instance(GameObject::new(Vec2::ZERO), StageSequencer::new(spawners), AddReason::None)
    }

    pub fn spawners(&self) -> &[Spawner] {
        &self.spawners
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn poll_spawners(&mut self, world: &mut World) {
        for spawner in &mut self.spawners {
            spawner.poll(world);
        }

        if self.finished || !self.spawners.iter().all(Spawner::is_exhausted) || world.instance_exists::<Enemy>() {
            return;
        }
        self.finished = true;
        log::info!("Stage finished at tick {}", world.ticks());
        world.emit(GameEvent::StageFinished);
        world.end();
    }
}

impl Behavior for StageSequencer {
    fn on_game_event(&mut self, _me: EntityId, event: GameEvent, world: &mut World) {
        if event == GameEvent::TickProcessed {
            self.poll_spawners(world);
        }
    }

    fn channels(&self) -> &'static [Channel] {
        &[Channel::General]
    }
}

/// Sideways zigzag at `speed`, starting along `first`
///
/// At every odd multiple of `beat` seconds the enemy drops for `turn` ticks,
/// then heads back the other way. It is removed after `lifetime` seconds.
fn zigzag(clock: &Clock, speed: f64, first: Vec2, beat: f64, turn: u64, lifetime: f64) -> Sequence {
    let mut seq = Sequence::new();
    let mut side = first;
    seq.add_step(SequenceStep::velocity(0, first * speed));
    for k in 0..4 {
        let at = clock.seconds(beat * (2 * k + 1) as f64).max(0) as u64;
        side = -side;
        seq.add_step(SequenceStep::velocity(at, DOWN * speed))
            .add_step(SequenceStep::velocity(at + turn, side * speed));
    }
    seq.add_step(SequenceStep::kill(clock.seconds(lifetime).max(0) as u64, RemoveReason::None));
    seq
}

/// Square loop twice, then a short staircase, then a sweep off screen
fn square_dance() -> Sequence {
    Sequence::with_steps([
        SequenceStep::velocity(0, DOWN * 0.5),
        SequenceStep::velocity(2, RIGHT * 0.5),
        SequenceStep::velocity(14, DOWN * 0.5),
        SequenceStep::velocity(26, LEFT * 0.5),
        SequenceStep::velocity(38, UP * 0.5),
        SequenceStep::repeat(49, 0, Some(2)),
        SequenceStep::velocity(50, RIGHT * 0.5),
        SequenceStep::velocity(54, DOWN * 0.5),
        SequenceStep::repeat(57, 50, Some(3)),
        SequenceStep::velocity(58, RIGHT * 0.5),
        SequenceStep::velocity(82, UP * 0.5),
        SequenceStep::velocity(106, LEFT * 0.5),
        SequenceStep::kill(154, RemoveReason::None),
    ])
}

/// The first stage: five waves over roughly twenty seconds
///
/// Fails if the clock is too slow to fit a wave's enemies into its window.
pub fn stage_one(clock: &Clock, arena: Rect) -> Result<Vec<Spawner>> {
    let s = |secs: f64| clock.seconds(secs);
    let (left, top, right) = (arena.left(), arena.top(), arena.right());

    let sweep = zigzag(clock, 0.5, LEFT, 0.25, 2, 4.0);
    let slow_sweep = zigzag(clock, 0.25, LEFT, 0.5, 4, 8.0);

    // Dives in diagonally before zigzagging the other way
    let mut dive = Sequence::with_steps([SequenceStep::velocity(0, Vec2::ONE)]);
    dive.add_steps(zigzag(clock, 0.5, RIGHT, 0.25, 2, 4.0).steps().iter().cloned().map(|mut step| {
        if step.tick == 0 {
            step.tick = 2;
        }
        step
    }));

    Ok(vec![
        Spawner::new(s(0.0), s(1.0), Vec2::new(right - 7.0, top), Grunt, 8, sweep)?,
        Spawner::new(s(2.0), s(1.0), Vec2::new(right - 10.0, top - 2.0), Heavy, 4, slow_sweep)?,
        Spawner::new(s(8.0), s(2.0), Vec2::new(left + 5.0, top), Grunt, 16, dive.clone())?,
        Spawner::new(s(12.0), s(1.0), Vec2::new(right - 8.0, top), Grunt, 16, dive)?,
        Spawner::new(s(16.0), s(4.0), Vec2::new(left + 4.0, top), Skimmer, 4, square_dance())?,
    ])
}
