// Canvas backend that rasterises world coordinates into a terminal cell grid.

use std::io::Write;

use crossterm::style::{self, Print, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::{cursor, queue};

use crate::domain::geometry::Rect;
use crate::domain::ports::{Canvas, Color, RenderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    glyph: char,
    color: Color,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: Color::White,
};

pub struct TerminalCanvas<W: Write> {
    out: W,
    columns: u16,
    // Rows for the play field; one more row below holds the status line.
    rows: u16,
    cells: Vec<Cell>,
    status: String,
    world: (f32, f32),
}

impl<W: Write> TerminalCanvas<W> {
    /// `rows` is the full terminal height, status line included.
    pub fn new(out: W, columns: u16, rows: u16) -> Self {
        let mut canvas = Self {
            out,
            columns: 0,
            rows: 0,
            cells: Vec::new(),
            status: String::new(),
            world: (1.0, 1.0),
        };
        canvas.resize(columns, rows);
        canvas
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows.saturating_sub(1);
        self.cells = vec![BLANK; self.columns as usize * self.rows as usize];
    }

    /// World units covered by one cell, horizontally and vertically.
    pub fn world_per_cell(&self) -> (f32, f32) {
        (
            self.world.0 / self.columns.max(1) as f32,
            self.world.1 / self.rows.max(1) as f32,
        )
    }

    /// Glyph at a cell, for inspection.
    pub fn glyph(&self, column: u16, row: u16) -> Option<char> {
        self.index(column as i32, row as i32)
            .map(|index| self.cells[index].glyph)
    }

    pub fn status_line(&self) -> &str {
        &self.status
    }

    fn index(&self, column: i32, row: i32) -> Option<usize> {
        if column < 0 || row < 0 || column >= self.columns as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(row as usize * self.columns as usize + column as usize)
    }

    fn put(&mut self, column: i32, row: i32, glyph: char, color: Color) {
        if let Some(index) = self.index(column, row) {
            self.cells[index] = Cell { glyph, color };
        }
    }

    fn to_cell(&self, x: f32, y: f32) -> (i32, i32) {
        let (cell_w, cell_h) = self.world_per_cell();
        ((x / cell_w).floor() as i32, (y / cell_h).floor() as i32)
    }

    // Cells a world rect touches, right and bottom exclusive; anything smaller than a cell
    // still gets one.
    fn cell_span(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let (cell_w, cell_h) = self.world_per_cell();
        let (left, top) = self.to_cell(rect.x, rect.y);
        let right = ((rect.x + rect.width) / cell_w).ceil() as i32;
        let bottom = ((rect.y + rect.height) / cell_h).ceil() as i32;
        (left, top, right.max(left + 1), bottom.max(top + 1))
    }

    fn ensure_surface(&self) -> Result<(), RenderError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(RenderError::Surface(format!(
                "terminal too small ({}x{})",
                self.columns,
                self.rows + 1
            )));
        }
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn clear(&mut self, world_width: f32, world_height: f32) -> Result<(), RenderError> {
        self.ensure_surface()?;
        self.world = (world_width.max(1.0), world_height.max(1.0));
        self.cells.fill(BLANK);
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
        let (left, top, right, bottom) = self.cell_span(rect);
        for row in top..bottom {
            for column in left..right {
                self.put(column, row, '█', color);
            }
        }
        Ok(())
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError> {
        let (left, top, right, bottom) = self.cell_span(rect);
        for column in left..right {
            self.put(column, top, '─', color);
            self.put(column, bottom - 1, '─', color);
        }
        for row in top..bottom {
            self.put(left, row, '│', color);
            self.put(right - 1, row, '│', color);
        }
        Ok(())
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) -> Result<(), RenderError> {
        let (cell_w, cell_h) = self.world_per_cell();
        if radius < cell_w.min(cell_h) {
            let (column, row) = self.to_cell(x, y);
            self.put(column, row, '●', color);
            return Ok(());
        }
        let (left, top, right, bottom) =
            self.cell_span(Rect::new(x - radius, y - radius, radius * 2.0, radius * 2.0));
        for row in top..bottom {
            for column in left..right {
                let cx = (column as f32 + 0.5) * cell_w - x;
                let cy = (row as f32 + 0.5) * cell_h - y;
                if cx * cx + cy * cy <= radius * radius {
                    self.put(column, row, '█', color);
                }
            }
        }
        Ok(())
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color) -> Result<(), RenderError> {
        let (column, row) = self.to_cell(x, y);
        for (offset, glyph) in text.chars().enumerate() {
            self.put(column + offset as i32, row, glyph, color);
        }
        Ok(())
    }

    fn status(&mut self, line: &str) -> Result<(), RenderError> {
        self.status = line.chars().take(self.columns as usize).collect();
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.ensure_surface()?;
        let mut current: Option<Color> = None;
        for row in 0..self.rows {
            queue!(self.out, cursor::MoveTo(0, row))?;
            let start = row as usize * self.columns as usize;
            for cell in &self.cells[start..start + self.columns as usize] {
                if current != Some(cell.color) {
                    queue!(self.out, SetForegroundColor(terminal_color(cell.color)))?;
                    current = Some(cell.color);
                }
                queue!(self.out, Print(cell.glyph))?;
            }
        }
        let status = self.status.clone();
        queue!(
            self.out,
            cursor::MoveTo(0, self.rows),
            SetForegroundColor(style::Color::White),
            Clear(ClearType::CurrentLine),
            Print(status),
            style::ResetColor
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn size(&self) -> (f32, f32) {
        self.world
    }
}

fn terminal_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Gray => style::Color::DarkGrey,
        Color::Red => style::Color::Red,
        Color::Green => style::Color::Green,
        Color::Blue => style::Color::Blue,
        Color::Cyan => style::Color::Cyan,
        Color::Yellow => style::Color::Yellow,
        Color::Magenta => style::Color::Magenta,
        Color::Orange => style::Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
    }
}
