//! Session settings
//!
//! Stored as JSON next to the binary. A missing or unreadable file falls back
//! to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::sim::clock::Clock;
use crate::sim::rect::Rect;

/// Where frames go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderTarget {
    /// Character grid printed to the terminal
    #[default]
    Text,
    /// No output at all
    Headless,
}

impl RenderTarget {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RenderTarget::Text => "text",
            RenderTarget::Headless => "headless",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "console" => Some(RenderTarget::Text),
            "headless" | "none" => Some(RenderTarget::Headless),
            _ => None,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulation rate, clamped to 1..=1000
    pub ticks_per_second: f64,
    /// Extra per-tick trace logging
    pub debug: bool,
    /// Seed for the session RNG
    pub seed: u64,
    /// Player bullets kept in the pool
    pub bullet_pool_size: usize,
    /// Playable area in cells
    pub arena: Rect,
    pub target: RenderTarget,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ticks_per_second: DEFAULT_TPS,
            debug: false,
            seed: 0x5eed,
            bullet_pool_size: BULLET_POOL_SIZE,
            arena: Rect::from_coords(ARENA_LEFT, ARENA_TOP, ARENA_RIGHT, ARENA_BOTTOM),
            target: RenderTarget::Text,
            max_ticks: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from `path`, or fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    /// Switch to the target called `name`; unknown names leave it unchanged
    pub fn override_target(&mut self, name: &str) -> bool {
        match RenderTarget::from_str(name) {
            Some(target) => {
                log::info!("Render target overridden to {}", target.as_str());
                self.target = target;
                true
            }
            None => {
                log::warn!("Unknown render target '{}', keeping {}", name, self.target.as_str());
                false
            }
        }
    }

    /// Clock for the configured rate (clamped)
    pub fn clock(&self) -> Clock {
        Clock::new(self.ticks_per_second)
    }

    pub fn arena_rect(&self) -> Rect {
        self.arena
    }

    /// Text grid size that fits the arena plus its border
    pub fn grid_size(&self) -> (usize, usize) {
        let w = self.arena.v2().x.max(0.0) as usize + 2;
        let h = self.arena.v2().y.max(0.0) as usize + 2;
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.ticks_per_second, 60.0);
        assert_eq!(s.bullet_pool_size, 500);
        assert_eq!(s.target, RenderTarget::Text);
        assert_eq!(s.arena, Rect::from_coords(1.0, 1.0, 59.0, 23.0));
        assert_eq!(s.grid_size(), (61, 25));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{"ticks_per_second": 5000, "target": "Headless"}"#).unwrap();
        assert_eq!(s.target, RenderTarget::Headless);
        assert_eq!(s.clock().ticks_per_second(), 1000.0);
        assert_eq!(s.seed, Settings::default().seed);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut s = Settings::default();
        s.max_ticks = Some(120);
        s.debug = true;
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(crate::EngineError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let s = Settings::load_or_default("/definitely/not/here/settings.json");
        assert_eq!(s, Settings::default());
        assert!(matches!(
            Settings::load("/definitely/not/here/settings.json"),
            Err(crate::EngineError::Io(_))
        ));
    }

    #[test]
    fn test_render_target_names() {
        assert_eq!(RenderTarget::from_str("Console"), Some(RenderTarget::Text));
        assert_eq!(RenderTarget::from_str("none"), Some(RenderTarget::Headless));
        assert_eq!(RenderTarget::from_str("forms"), None);
        assert_eq!(RenderTarget::Headless.as_str(), "headless");
    }

    #[test]
    fn test_override_target() {
        let mut s = Settings::default();
        assert!(s.override_target("NONE"));
        assert_eq!(s.target, RenderTarget::Headless);
        assert!(!s.override_target("forms"));
        assert_eq!(s.target, RenderTarget::Headless);
        assert!(s.override_target("console"));
        assert_eq!(s.target, RenderTarget::Text);
    }
}
