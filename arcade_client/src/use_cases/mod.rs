// Use cases layer: the client loop, connection policy and one session per game.

pub mod client_loop;
pub mod pong_session;
pub mod reconnect;
pub mod shooter_session;
pub mod tank_session;
pub mod types;

pub use client_loop::{ClientLoop, GameSession, LoopCommand, LoopSettings, SessionAction};
pub use pong_session::PongSession;
pub use reconnect::{ReconnectPolicy, ReconnectSchedule};
pub use shooter_session::ShooterSession;
pub use tank_session::TankSession;
pub use types::{Authority, ConnectionState, NetEvent};
