// Domain layer: entities, pools and the per-game rules. No I/O lives here.

pub mod animation;
pub mod body;
pub mod geometry;
pub mod input;
pub mod pong;
pub mod pool;
pub mod ports;
pub mod shooter;
pub mod tank;
pub mod tuning;

pub use body::{Body, DamageOutcome, Ship};
pub use geometry::{Bounds, Rect};
pub use input::InputState;
pub use pool::{Pool, Poolable};
pub use ports::{Canvas, Color, RenderError};
