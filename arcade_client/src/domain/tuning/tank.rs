/// Gameplay tuning for the tank practice arena.
///
/// Per-class stats live on `TankClass`; this covers the arena and shared weapon rules.

#[derive(Debug, Clone, Copy)]
pub struct TankTuning {
    /// Arena size in pixels.
    pub arena_width: f32,
    pub arena_height: f32,

    /// Hull rotation speed in radians per second.
    pub rotation_speed: f32,

    /// Reverse speed as a fraction of forward speed.
    pub reverse_factor: f32,

    /// Shell speed in pixels per second.
    pub bullet_speed: f32,

    /// Shell lifetime in seconds.
    pub bullet_life_time: f32,

    /// Shell collision radius in pixels.
    pub bullet_radius: f32,

    /// Seconds a destroyed tank waits before respawning.
    pub respawn_seconds: f32,

    /// Pool capacities.
    pub bullet_capacity: usize,
    pub explosion_capacity: usize,

    /// Seconds an explosion stays on screen.
    pub explosion_seconds: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            arena_width: 800.0,
            arena_height: 600.0,
            rotation_speed: 3.0,
            reverse_factor: 0.5,
            bullet_speed: 400.0,
            bullet_life_time: 3.0,
            bullet_radius: 3.0,
            respawn_seconds: 3.0,
            bullet_capacity: 64,
            explosion_capacity: 16,
            explosion_seconds: 0.8,
        }
    }
}
