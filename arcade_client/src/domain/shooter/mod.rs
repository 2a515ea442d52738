// Side-scrolling shooter: ships, pooled projectiles and pickups, the boss state machine and
// the world that ties them together.

pub mod backdrop;
pub mod boss;
pub mod enemy;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod world;

pub use boss::{Boss, BossPhase, MovePattern, ShootPattern};
pub use enemy::Popcorn;
pub use pickup::{Explosion, PowerUp};
pub use player::PlayerShip;
pub use projectile::{BossBullet, PlayerBullet};
pub use world::{RemotePlayer, Screen, ShooterEvent, ShooterWorld};
