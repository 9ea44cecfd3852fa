//! Shmup entry point
//!
//! Loads settings (path from the first argument, `shmup.json` by default;
//! an optional second argument overrides the render target),
//! sets up stage one and runs it in real time. The text target redraws the
//! arena in the terminal every tick; the headless target only logs.
//!
//! There is no keyboard backend: the ship flies a short scripted demo.

use std::io::{self, Write};

use shmup::game::{self, Player};
use shmup::sim::input::{GameButton, ScriptedInput};
use shmup::sim::render::{Backend, Renderer, Sprite, TextGrid};
use shmup::sim::tick;
use shmup::sim::vec::Vec2;
use shmup::sim::world::World;
use shmup::{RenderTarget, Settings};

const DEFAULT_SETTINGS_PATH: &str = "shmup.json";

/// Prints every finished frame over the previous one
struct TerminalEcho<'a> {
    grid: &'a mut TextGrid,
    out: io::StdoutLock<'static>,
}

impl Renderer for TerminalEcho<'_> {
    fn clear(&mut self) {
        self.grid.clear();
    }

    fn draw(&mut self, pos: Vec2, sprite: &Sprite) {
        self.grid.draw(pos, sprite);
    }

    fn present(&mut self) {
        self.grid.present();
        // Cursor home, then the frame
        if let Err(e) = write!(self.out, "\x1b[H{}", self.grid.frame()).and_then(|_| self.out.flush()) {
            log::warn!("Failed to write frame: {}", e);
        }
    }
}

/// Weave left and right while shooting, focus for a pass, then drift back
fn demo_input() -> ScriptedInput {
    ScriptedInput::new()
        .hold(GameButton::Left, 60, 80)
        .press(80, GameButton::A)
        .hold(GameButton::Right, 200, 240)
        .press(240, GameButton::A)
        .press(400, GameButton::C)
        .hold(GameButton::Left, 420, 470)
        .press(470, GameButton::A)
        .press(600, GameButton::C)
        .hold(GameButton::Up, 620, 630)
        .press(630, GameButton::A)
}

fn run() -> shmup::Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let mut settings = Settings::load_or_default(&path);
    if let Some(target) = args.next() {
        settings.override_target(&target);
    }

    let mut world = World::from_settings(&settings);
    let player = game::start_stage_one(&mut world, &settings)?;

    let (width, height) = settings.grid_size();
    let mut backend = Backend::for_target(settings.target, width, height);
    let mut input = demo_input();

    let ticks = match settings.target {
        RenderTarget::Text => {
            let grid = backend.text_grid()?;
            let mut out = io::stdout().lock();
            write!(out, "\x1b[2J")?;
            let mut echo = TerminalEcho { grid, out };
            tick::run(&mut world, &mut input, &mut echo, &settings)
        }
        RenderTarget::Headless => tick::run(&mut world, &mut input, backend.renderer(), &settings),
    };

    if let Some(p) = world.behavior::<Player>(player) {
        log::info!(
            "Final: score {} | lives {} | power {:.2} | graze {} | {} ticks",
            p.score(),
            p.lives(),
            p.power(),
            p.graze(),
            ticks
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Shmup starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
