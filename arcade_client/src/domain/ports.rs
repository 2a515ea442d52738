use std::fmt;

use crate::domain::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    White,
    Gray,
    Red,
    Green,
    Blue,
    Cyan,
    Yellow,
    Magenta,
    Orange,
}

// Drawing failures surfaced by a canvas backend.
#[derive(Debug)]
pub enum RenderError {
    Io(std::io::Error),
    // The surface cannot hold a frame (for example a zero-sized terminal).
    Surface(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Io(err) => write!(f, "render io error: {err}"),
            RenderError::Surface(reason) => write!(f, "render surface error: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

// Port for drawing a frame. Coordinates are world units; `clear` fixes the world size the
// backend scales from until the next frame.
pub trait Canvas {
    fn clear(&mut self, world_width: f32, world_height: f32) -> Result<(), RenderError>;
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError>;
    fn stroke_rect(&mut self, rect: Rect, color: Color) -> Result<(), RenderError>;
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) -> Result<(), RenderError>;
    fn text(&mut self, x: f32, y: f32, text: &str, color: Color) -> Result<(), RenderError>;
    // Status line below the play field.
    fn status(&mut self, line: &str) -> Result<(), RenderError>;
    fn present(&mut self) -> Result<(), RenderError>;
    // World size set by the last `clear`.
    fn size(&self) -> (f32, f32);
}
