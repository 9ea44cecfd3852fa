//! Real-time tick driver
//!
//! [`World::tick`] is a single synchronous step with no notion of time. This
//! module paces those steps against the wall clock: elapsed time accumulates
//! and is spent one tick duration at a time, with a cap on catch-up steps so a
//! long stall doesn't turn into a burst of hundreds of ticks.

use std::thread;
use std::time::{Duration, Instant};

use crate::settings::Settings;

use super::input::InputSource;
use super::render::Renderer;
use super::world::World;

/// Most ticks run back to back before the backlog is dropped
pub const MAX_CATCH_UP: u32 = 4;

/// Wall-clock pacing state
#[derive(Debug, Clone)]
pub struct Pacer {
    tick_len: Duration,
    accumulator: Duration,
    last: Instant,
}

impl Pacer {
    pub fn new(tick_len: Duration) -> Self {
        Self {
            tick_len,
            accumulator: Duration::ZERO,
            last: Instant::now(),
        }
    }

    pub fn tick_len(&self) -> Duration {
        self.tick_len
    }

    /// Bank the time passed since the previous call; returns how many ticks
    /// are due now, at most [`MAX_CATCH_UP`]
    pub fn due(&mut self, now: Instant) -> u32 {
        self.accumulator += now.saturating_duration_since(self.last);
        self.last = now;

        let mut steps = 0;
        while self.accumulator >= self.tick_len && steps < MAX_CATCH_UP {
            self.accumulator -= self.tick_len;
            steps += 1;
        }
        if steps == MAX_CATCH_UP && self.accumulator >= self.tick_len {
            log::debug!("Dropping {:?} of tick backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        steps
    }
}

/// Run `world` in real time until it ends or `settings.max_ticks` have run
///
/// Spins on the wall clock between ticks, yielding the thread while nothing is
/// due. Returns the number of ticks executed.
pub fn run(world: &mut World, input: &mut dyn InputSource, renderer: &mut dyn Renderer, settings: &Settings) -> u64 {
    let mut pacer = Pacer::new(world.clock().tick_duration());
    let limit = settings.max_ticks.unwrap_or(u64::MAX);
    let mut ran = 0;

    log::info!(
        "Running at {} ticks/s ({:?} per tick)",
        world.clock().ticks_per_second(),
        pacer.tick_len()
    );

    // The first tick goes out immediately
    world.tick(input, renderer);
    ran += 1;

    while !world.ended() && ran < limit {
        let due = pacer.due(Instant::now());
        if due == 0 {
            thread::yield_now();
            continue;
        }
        for _ in 0..due {
            if world.ended() || ran >= limit {
                break;
            }
            world.tick(input, renderer);
            ran += 1;
        }
    }

    log::info!("Stopped after {} ticks (ended: {})", ran, world.ended());
    ran
}

/// Run up to `ticks` ticks back to back, stopping early if the world ends
pub fn run_for(world: &mut World, input: &mut dyn InputSource, renderer: &mut dyn Renderer, ticks: u64) -> u64 {
    let mut ran = 0;
    while ran < ticks && !world.ended() {
        world.tick(input, renderer);
        ran += 1;
    }
    ran
}
