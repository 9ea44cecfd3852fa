//! Render capability
//!
//! The engine only decides what is drawn and where. A [`Renderer`] turns that
//! into output; two are provided: [`TextGrid`] rasterises sprites into an
//! in-memory character grid, [`NullRenderer`] drops everything.

use crate::error::{EngineError, Result};
use crate::settings::RenderTarget;

use super::vec::{Vec2, Vec2Ext};

/// Character art drawn at an object's position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub rows: Vec<String>,
    /// Draw around the position instead of from its top-left
    pub centered: bool,
}

impl Sprite {
    pub fn new(rows: &[&str], centered: bool) -> Self {
        Self {
            rows: rows.iter().map(|r| r.to_string()).collect(),
            centered,
        }
    }

    /// Single-cell sprite
    pub fn glyph(c: char) -> Self {
        Self {
            rows: vec![c.to_string()],
            centered: false,
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// How an object shows up on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub visible: bool,
    pub sprite: Sprite,
}

impl Display {
    pub fn new(sprite: Sprite) -> Self {
        Self { visible: true, sprite }
    }

    pub fn glyph(c: char) -> Self {
        Self::new(Sprite::glyph(c))
    }

    /// Hand the sprite to the renderer unless hidden
    pub fn draw(&self, pos: Vec2, renderer: &mut dyn Renderer) {
        if self.visible {
            renderer.draw(pos, &self.sprite);
        }
    }
}

/// Output backend driven once per tick
pub trait Renderer {
    fn clear(&mut self);
    fn draw(&mut self, pos: Vec2, sprite: &Sprite);
    fn present(&mut self);
}

/// Discards all drawing
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
}

impl Renderer for NullRenderer {
    fn clear(&mut self) {}

    fn draw(&mut self, _pos: Vec2, _sprite: &Sprite) {}

    fn present(&mut self) {
        self.frames += 1;
    }
}

/// Console-cell renderer backed by a character buffer
#[derive(Debug, Clone)]
pub struct TextGrid {
    width: usize,
    height: usize,
    cells: Vec<char>,
    frame: String,
    frames: u64,
}

impl TextGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
            frame: String::new(),
            frames: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Character at a cell of the working buffer
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Last presented frame, rows joined by newlines
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn put(&mut self, x: i64, y: i64, c: char) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = c;
        }
    }
}

impl Renderer for TextGrid {
    fn clear(&mut self) {
        self.cells.fill(' ');
    }

    fn draw(&mut self, pos: Vec2, sprite: &Sprite) {
        let mut x0 = pos.ix();
        let mut y0 = pos.iy();
        if sprite.centered {
            x0 -= (sprite.width() / 2) as i64;
            y0 -= (sprite.height() / 2) as i64;
        }
        for (dy, row) in sprite.rows.iter().enumerate() {
            for (dx, c) in row.chars().enumerate() {
                // Spaces are transparent
                if c != ' ' {
                    self.put(x0 + dx as i64, y0 + dy as i64, c);
                }
            }
        }
    }

    fn present(&mut self) {
        self.frame = self
            .cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        self.frames += 1;
    }
}

/// The session's active output backend
#[derive(Debug)]
pub enum Backend {
    Text(TextGrid),
    Headless(NullRenderer),
}

impl Backend {
    /// Backend for a render target, sized in cells
    pub fn for_target(target: RenderTarget, width: usize, height: usize) -> Self {
        match target {
            RenderTarget::Text => Backend::Text(TextGrid::new(width, height)),
            RenderTarget::Headless => Backend::Headless(NullRenderer::default()),
        }
    }

    pub fn target(&self) -> RenderTarget {
        match self {
            Backend::Text(_) => RenderTarget::Text,
            Backend::Headless(_) => RenderTarget::Headless,
        }
    }

    pub fn renderer(&mut self) -> &mut dyn Renderer {
        match self {
            Backend::Text(grid) => grid,
            Backend::Headless(null) => null,
        }
    }

    /// The text grid, if that is the active target
    pub fn text_grid(&mut self) -> Result<&mut TextGrid> {
        match self {
            Backend::Text(grid) => Ok(grid),
            Backend::Headless(_) => Err(EngineError::MissingBackend {
                requested: RenderTarget::Text.as_str(),
                active: RenderTarget::Headless.as_str(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_draws_and_clips() {
        let mut grid = TextGrid::new(4, 2);
        grid.clear();
        grid.draw(Vec2::new(1.0, 0.0), &Sprite::glyph('A'));
        grid.draw(Vec2::new(3.0, 1.0), &Sprite::new(&["BC"], false));
        grid.draw(Vec2::new(-1.0, 0.0), &Sprite::glyph('X'));
        grid.present();
        assert_eq!(grid.frame(), " A  \n   B");
        assert_eq!(grid.frames(), 1);
    }

    #[test]
    fn test_centered_sprite_with_transparency() {
        let mut grid = TextGrid::new(5, 3);
        grid.draw(Vec2::new(2.0, 1.0), &Sprite::new(&["/-\\", "| |", "\\-/"], true));
        assert_eq!(grid.cell(1, 0), Some('/'));
        assert_eq!(grid.cell(2, 1), Some(' '));
        assert_eq!(grid.cell(3, 2), Some('/'));
        assert_eq!(grid.cell(5, 0), None);
    }

    #[test]
    fn test_hidden_display_is_skipped() {
        let mut grid = TextGrid::new(3, 1);
        let mut display = Display::glyph('o');
        display.visible = false;
        display.draw(Vec2::ZERO, &mut grid);
        assert_eq!(grid.cell(0, 0), Some(' '));
        display.visible = true;
        display.draw(Vec2::ZERO, &mut grid);
        assert_eq!(grid.cell(0, 0), Some('o'));
    }

    #[test]
    fn test_missing_backend() {
        let mut backend = Backend::for_target(RenderTarget::Headless, 10, 10);
        assert!(matches!(
            backend.text_grid(),
            Err(EngineError::MissingBackend { requested: "text", active: "headless" })
        ));

        let mut backend = Backend::for_target(RenderTarget::Text, 10, 10);
        assert!(backend.text_grid().is_ok());
    }
}
