//! Player input
//!
//! An [`InputSource`] is polled once per tick and never blocks. [`InputState`]
//! keeps the rolling history gameplay code reads from.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameButton {
    Up,
    Down,
    Left,
    Right,
    /// Face buttons
    A,
    B,
    C,
    Start,
    Escape,
}

/// A button observed at a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInput {
    pub button: GameButton,
    pub tick: u64,
}

/// Key-down and key-up edges, for sources that can tell them apart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Edges {
    pub pressed: Option<GameButton>,
    pub released: Option<GameButton>,
}

pub trait InputSource {
    /// Button held this tick, if any
    fn poll(&mut self, tick: u64) -> Option<GameButton>;

    fn edges(&mut self, _tick: u64) -> Edges {
        Edges::default()
    }
}

/// Rolling input history, refreshed at the start of every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    /// The button seen before `last`
    pub previous: Option<GameInput>,
    /// Most recent button ever seen
    pub last: Option<GameInput>,
    /// Button seen this tick
    pub current: Option<GameInput>,
    pub pressed: Option<GameInput>,
    pub released: Option<GameInput>,
}

impl InputState {
    pub fn update(&mut self, source: &mut dyn InputSource, tick: u64) {
        self.current = None;

        let edges = source.edges(tick);
        if let Some(button) = edges.pressed {
            self.pressed = Some(GameInput { button, tick });
        }
        if let Some(button) = edges.released {
            self.released = Some(GameInput { button, tick });
        }

        if let Some(button) = source.poll(tick) {
            self.previous = self.last;
            self.last = Some(GameInput { button, tick });
            self.current = self.last;
        }
    }

    /// Whether `button` is held this tick
    pub fn button_pressed(&self, button: GameButton) -> bool {
        self.current.is_some_and(|i| i.button == button)
    }

    /// Whether `button` went up: reported by the source, or no longer current
    pub fn button_released(&self, button: GameButton) -> bool {
        if self.released.is_some_and(|i| i.button == button) {
            return true;
        }
        let current = self.current.map(|i| i.button);
        self.last.is_some_and(|i| i.button == button && current != Some(button))
    }

    /// Tick of the most recent input, if any
    pub fn last_tick(&self) -> Option<u64> {
        self.last.map(|i| i.tick)
    }
}

/// Never reports a button
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _tick: u64) -> Option<GameButton> {
        None
    }
}

/// Replays a fixed tick -> button script
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: BTreeMap<u64, GameButton>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(mut self, tick: u64, button: GameButton) -> Self {
        self.script.insert(tick, button);
        self
    }

    /// Hold `button` for every tick in `from..to`
    pub fn hold(mut self, button: GameButton, from: u64, to: u64) -> Self {
        for tick in from..to {
            self.script.insert(tick, button);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.script.len()
    }

    pub fn is_empty(&self) -> bool {
        self.script.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> Option<GameButton> {
        self.script.get(&tick).copied()
    }
}
