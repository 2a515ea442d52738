// Per-game views and the terminal canvas they draw on.
//
// Views read session state and never change it, so they can run every frame whatever the
// connection state is.

pub mod pong;
pub mod shooter;
pub mod tank;
pub mod terminal;

pub use terminal::TerminalCanvas;

use crate::domain::ports::{Canvas, RenderError};

/// Draws one frame of a session.
pub trait View {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), RenderError>;
}

impl View for crate::use_cases::PongSession {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        pong::draw(self, canvas)
    }
}

impl View for crate::use_cases::TankSession {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        tank::draw(self, canvas)
    }
}

impl View for crate::use_cases::ShooterSession {
    fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        shooter::draw(self, canvas)
    }
}
