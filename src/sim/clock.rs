//! Tick clock
//!
//! Converts between wall-clock time and simulation ticks. Authored sequences
//! and spawners express their timings through these conversions, so the same
//! script plays at the same speed under any tick rate.

use std::time::Duration;

use crate::consts::{DEFAULT_TPS, MAX_TPS, MIN_TPS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    ticks_per_second: f64,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_TPS)
    }
}

impl Clock {
    /// Rates outside 1..=1000 are clamped
    pub fn new(ticks_per_second: f64) -> Self {
        let tps = if ticks_per_second.is_nan() {
            DEFAULT_TPS
        } else {
            ticks_per_second.clamp(MIN_TPS, MAX_TPS)
        };
        Self { ticks_per_second: tps }
    }

    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    pub fn set_ticks_per_second(&mut self, tps: f64) {
        *self = Self::new(tps);
    }

    /// Length of one tick in milliseconds
    pub fn base_tick_ms(&self) -> f64 {
        1000.0 / self.ticks_per_second
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos((1e9 / self.ticks_per_second).round() as u64)
    }

    /// Ticks elapsing in `s` seconds, rounded half to even
    pub fn seconds(&self, s: f64) -> i64 {
        (s * (1000.0 / self.base_tick_ms())).round_ties_even() as i64
    }

    pub fn minutes(&self, m: f64) -> i64 {
        self.seconds(m * 60.0)
    }

    pub fn hours(&self, h: f64) -> i64 {
        self.seconds(h * 3600.0)
    }

    pub fn to_seconds(&self, ticks: i64) -> f64 {
        ticks as f64 * self.base_tick_ms() / 1000.0
    }

    pub fn to_minutes(&self, ticks: i64) -> f64 {
        self.to_seconds(ticks) / 60.0
    }

    pub fn to_hours(&self, ticks: i64) -> f64 {
        self.to_seconds(ticks) / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(Clock::new(0.0).ticks_per_second(), 1.0);
        assert_eq!(Clock::new(5000.0).ticks_per_second(), 1000.0);
        assert_eq!(Clock::new(f64::NAN).ticks_per_second(), 60.0);
        assert_eq!(Clock::default().ticks_per_second(), 60.0);
    }

    #[test]
    fn test_conversions_at_default_rate() {
        let clock = Clock::default();
        assert_eq!(clock.seconds(1.0), 60);
        assert_eq!(clock.seconds(0.5), 30);
        assert_eq!(clock.minutes(1.0), 3600);
        assert_eq!(clock.hours(1.0), 216_000);
        assert!((clock.to_seconds(90) - 1.5).abs() < 1e-9);
        assert!((clock.to_minutes(3600) - 1.0).abs() < 1e-9);
        assert!((clock.to_hours(216_000) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_ticks_round_to_even() {
        let clock = Clock::new(1.0);
        assert_eq!(clock.seconds(2.5), 2);
        assert_eq!(clock.seconds(3.5), 4);
    }

    #[test]
    fn test_tick_duration() {
        let clock = Clock::new(50.0);
        assert_eq!(clock.tick_duration(), Duration::from_millis(20));
        assert!((clock.base_tick_ms() - 20.0).abs() < 1e-12);
    }
}
