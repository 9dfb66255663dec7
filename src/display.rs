//! Terminal painter: all terminal output lives here.
//!
//! The logical field is letterboxed into the terminal and rasterised into a
//! grid of cells (each cell is roughly twice as tall as it is wide).  Draw
//! calls blend into the grid; `present` writes the whole grid out.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    QueueableCommand,
};
use terra_escape::entities::Field;
use terra_escape::render::{Align, Painter, Rgba, SpriteId};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HINT: Rgba = Rgba::rgb(110, 120, 140);
const C_HINT_BG: Rgba = Rgba::rgb(0, 0, 0);
const C_DEFAULT_LETTERBOX: Rgba = Rgba::rgb(5, 7, 13);

// ── Sprites ───────────────────────────────────────────────────────────────────

struct Glyph {
    rows: &'static [&'static str],
    color: Rgba,
}

fn glyph(sprite: SpriteId) -> Glyph {
    match sprite {
        SpriteId::Luca => Glyph { rows: &["▲", "/█\\"], color: Rgba::rgb(140, 220, 255) },
        SpriteId::Marca => Glyph { rows: &["◆", "/█\\"], color: Rgba::rgb(255, 170, 210) },
        SpriteId::RoboBlue => Glyph { rows: &["«▼»", "╚═╝"], color: Rgba::rgb(80, 160, 255) },
        SpriteId::RoboRed => Glyph {
            rows: &["╔═◎═◎═╗", "║ ▀▀▀ ║", "╚╤═╤═╤╝"],
            color: Rgba::rgb(255, 90, 90),
        },
        SpriteId::Gun => Glyph { rows: &["★"], color: Rgba::rgb(255, 220, 120) },
        SpriteId::FishCan => Glyph { rows: &["♥"], color: Rgba::rgb(118, 210, 200) },
    }
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Mapping between logical field coordinates and terminal cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    scale: f32,
    off_x: f32,
    off_y: f32,
}

impl Viewport {
    /// Fit `field` into a terminal of `cols` x `rows`, keeping the last row
    /// for the controls hint.
    pub fn fit(cols: u16, rows: u16, field: &Field) -> Self {
        let usable_rows = rows.saturating_sub(1).max(1) as f32;
        let cols_f = cols.max(1) as f32;
        let scale = (cols_f / field.width).min(2.0 * usable_rows / field.height);
        let off_x = (cols_f - field.width * scale) / 2.0;
        let off_y = (usable_rows - field.height * scale / 2.0) / 2.0;
        Self { cols, rows, scale, off_x, off_y }
    }

    fn col(&self, x: f32) -> f32 {
        self.off_x + x * self.scale
    }

    fn row(&self, y: f32) -> f32 {
        self.off_y + y * self.scale / 2.0
    }

    /// Logical coordinates at the centre of a cell.
    pub fn to_logical(&self, col: u16, row: u16) -> (f32, f32) {
        let x = (col as f32 + 0.5 - self.off_x) / self.scale;
        let y = (row as f32 + 0.5 - self.off_y) * 2.0 / self.scale;
        (x, y)
    }
}

// ── Cell grid ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    ch: char,
    fg: Rgba,
    bg: Rgba,
}

fn blend(under: Rgba, over: Rgba) -> Rgba {
    let a = over.a.clamp(0.0, 1.0);
    let mix = |u: u8, o: u8| (u as f32 + (o as f32 - u as f32) * a).round() as u8;
    Rgba::rgb(mix(under.r, over.r), mix(under.g, over.g), mix(under.b, over.b))
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

pub struct TermPainter {
    view: Viewport,
    letterbox: Rgba,
    cells: Vec<Cell>,
}

impl TermPainter {
    pub fn new(letterbox_hex: &str) -> Self {
        Self {
            view: Viewport::fit(1, 1, &Field::default()),
            letterbox: Rgba::from_hex(letterbox_hex).unwrap_or(C_DEFAULT_LETTERBOX),
            cells: Vec::new(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.view
    }

    /// Resize to the terminal and clear to the letterbox colour.
    pub fn begin(&mut self, cols: u16, rows: u16, field: &Field) {
        self.view = Viewport::fit(cols, rows, field);
        let blank = Cell { ch: ' ', fg: self.letterbox, bg: self.letterbox };
        self.cells.clear();
        self.cells.resize(cols as usize * rows as usize, blank);
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        let (cols, rows) = (self.view.cols as i32, self.view.rows.saturating_sub(1) as i32);
        if col < 0 || row < 0 || col >= cols || row >= rows {
            return None;
        }
        self.cells.get_mut((row * cols + col) as usize)
    }

    fn put_char(&mut self, col: i32, row: i32, ch: char, color: Rgba) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.ch = ch;
            cell.fg = blend(cell.bg, color);
        }
    }

    fn put_str(&mut self, col: i32, row: i32, text: &str, color: Rgba) {
        for (i, ch) in text.chars().enumerate() {
            self.put_char(col + i as i32, row, ch, color);
        }
    }

    /// Write the frame plus a hint line on the last row.
    pub fn present<W: Write>(&self, out: &mut W, hint: &str) -> std::io::Result<()> {
        let cols = self.view.cols as usize;
        let last_row = self.view.rows.saturating_sub(1);

        for (row, line) in self.cells.chunks(cols.max(1)).enumerate().take(last_row as usize) {
            out.queue(cursor::MoveTo(0, row as u16))?;
            let mut current: Option<(Rgba, Rgba)> = None;
            for cell in line {
                if current != Some((cell.fg, cell.bg)) {
                    out.queue(style::SetForegroundColor(to_color(cell.fg)))?;
                    out.queue(style::SetBackgroundColor(to_color(cell.bg)))?;
                    current = Some((cell.fg, cell.bg));
                }
                out.queue(Print(cell.ch))?;
            }
        }

        draw_controls_hint(out, last_row, cols, hint)?;

        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, last_row))?;
        out.flush()?;
        Ok(())
    }
}

impl Painter for TermPainter {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let v = self.view;
        let c0 = v.col(x).round() as i32;
        let c1 = v.col(x + w).round().max(v.col(x).round() + 1.0) as i32;
        let r0 = v.row(y).round() as i32;
        // Thin rules (grid lines, bars) still cover one row.
        let r1 = v.row(y + h).round().max(v.row(y).round() + 1.0) as i32;
        for row in r0..r1 {
            for col in c0..c1 {
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.bg = blend(cell.bg, color);
                    cell.fg = blend(cell.fg, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Rgba) {
        let v = self.view;
        let (cx, cy) = (v.col(x), v.row(y));
        let (rx, ry) = (r * v.scale, r * v.scale / 2.0);
        if rx < 0.75 || ry < 0.5 {
            let ch = if rx < 0.35 { '·' } else { '•' };
            self.put_char(cx.floor() as i32, cy.floor() as i32, ch, color);
            return;
        }
        for row in (cy - ry).floor() as i32..=(cy + ry).ceil() as i32 {
            for col in (cx - rx).floor() as i32..=(cx + rx).ceil() as i32 {
                let dx = (col as f32 + 0.5 - cx) / rx;
                let dy = (row as f32 + 0.5 - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    if let Some(cell) = self.cell_mut(col, row) {
                        cell.bg = blend(cell.bg, color);
                    }
                }
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba, align: Align) {
        let len = text.chars().count() as f32;
        let col = self.view.col(x);
        let start = match align {
            Align::Left => col,
            Align::Center => col - len / 2.0,
            Align::Right => col - len,
        };
        let row = self.view.row(y).floor() as i32;
        self.put_str(start.round() as i32, row, text, color);
    }

    /// Glyph art is only legible when the sprite box is at least as wide as
    /// the art; smaller viewports fall back to primitives.
    fn sprite(&mut self, sprite: SpriteId, x: f32, y: f32, size: f32) -> bool {
        let g = glyph(sprite);
        let width = g.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as f32;
        if size * self.view.scale < width {
            return false;
        }
        let top = self.view.row(y).floor() as i32 - g.rows.len() as i32 / 2;
        let left = (self.view.col(x) - width / 2.0).round() as i32;
        for (i, line) in g.rows.iter().enumerate() {
            let pad = (width as usize - line.chars().count()) / 2;
            self.put_str(left + pad as i32, top + i as i32, line, g.color);
        }
        true
    }
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, row: u16, cols: usize, hint: &str) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, row))?;
    out.queue(style::SetBackgroundColor(to_color(C_HINT_BG)))?;
    out.queue(style::SetForegroundColor(to_color(C_HINT)))?;
    // Leave the bottom-right cell untouched so the terminal never scrolls.
    let width = cols.saturating_sub(2);
    let line: String = hint.chars().take(width).collect();
    out.queue(Print(format!(" {line:<width$}")))?;
    Ok(())
}
