// Gameplay tuning, kept apart from runtime configuration.

pub mod pong;
pub mod shooter;
pub mod tank;
