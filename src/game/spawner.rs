//! Timed enemy waves
//!
//! A [`Spawner`] is a pure timer. Polled once per tick, it puts one enemy at
//! its position every `interval` ticks inside its window until its count runs
//! out. The window includes both its first and its last tick.

use std::fmt;
use std::rc::Rc;

use crate::error::{EngineError, Result};
use crate::sim::events::AddReason;
use crate::sim::sequence::Sequence;
use crate::sim::vec::Vec2;
use crate::sim::world::{EntityId, World};

use super::enemy::{Enemy, Recipe};

#[derive(Clone)]
pub struct Spawner {
    start: i64,
    end: i64,
    interval: i64,
    remaining: i64,
    pos: Vec2,
    recipe: Rc<dyn Recipe>,
    sequence: Sequence,
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spawner")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("interval", &self.interval)
            .field("remaining", &self.remaining)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl Spawner {
    /// Spawn `amount` enemies evenly over `duration` ticks starting at `start`
    ///
    /// Fails unless `start >= 0`, `duration >= 0` and `1 <= amount <= duration`,
    /// or when the window would end past the last representable tick.
    pub fn new(
        start: i64,
        duration: i64,
        pos: Vec2,
        recipe: impl Recipe + 'static,
        amount: i64,
        sequence: Sequence,
    ) -> Result<Self> {
        if start < 0 {
            return Err(EngineError::NegativeSpawnStart(start));
        }
        if duration < 0 {
            return Err(EngineError::NegativeSpawnDuration(duration));
        }
        if amount < 1 || amount > duration {
            return Err(EngineError::SpawnAmountOutOfRange { amount, duration });
        }
        let end = start
            .checked_add(duration)
            .ok_or(EngineError::SpawnWindowOverflow { start, duration })?;

        Ok(Self {
            start,
            end,
            interval: duration / (amount - 1).max(1),
            remaining: amount,
            pos,
            recipe: Rc::new(recipe),
            sequence,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Last tick of the window
    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    /// Template cloned into every spawned enemy
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }

    /// Whether this spawner fires at tick `now`
    pub fn is_due(&self, now: i64) -> bool {
        self.remaining > 0 && now >= self.start && now <= self.end && (now - self.start) % self.interval == 0
    }

    /// Check the world's tick counter and spawn if due
    pub fn poll(&mut self, world: &mut World) -> Option<EntityId> {
        let now = i64::try_from(world.ticks()).ok()?;
        if !self.is_due(now) {
            return None;
        }
        self.remaining -= 1;
        let id = Enemy::spawn(world, self.pos, &*self.recipe, &self.sequence, AddReason::None);
        log::debug!("Spawner at tick {} produced {} ({} left)", now, id, self.remaining);
        Some(id)
    }
}
