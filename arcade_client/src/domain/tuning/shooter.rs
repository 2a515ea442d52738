/// Gameplay tuning for the side-scrolling shooter.
///
/// Speeds are pixels per tick and timers are in ticks, matching the fixed 60 Hz step.

#[derive(Debug, Clone, Copy)]
pub struct ShooterTuning {
    /// Play-field size in pixels.
    pub field_width: f32,
    pub field_height: f32,

    /// Ticks per difficulty wave.
    pub wave_ticks: u64,

    /// Enemy spawn interval per difficulty tier.
    pub enemy_timer_easy: u64,
    pub enemy_timer_medium: u64,
    pub enemy_timer_hard: u64,
    pub enemy_timer_nightmare: u64,

    /// Ticks between power-up spawns.
    pub power_up_timer: u64,

    /// Ticks the intro overdrive lasts in single player.
    pub overdrive_ticks: u64,

    pub player_speed: f32,
    pub player_health: i32,
    pub player_hit_box: f32,
    /// Ticks between shots while firing.
    pub fire_cooldown: u32,
    pub bullet_speed: f32,
    pub starting_lives: u32,

    pub popcorn_speed: f32,
    pub popcorn_health: i32,
    pub popcorn_value: u64,

    pub power_up_speed: f32,
    pub power_up_value: u64,

    pub boss_health: i32,
    pub boss_value: u64,

    /// Damage table.
    pub bullet_damage: i32,
    pub ram_damage: i32,
    pub boss_bullet_damage: i32,
    pub boss_ram_damage: i32,

    /// Points spent to revive a teammate in multiplayer.
    pub revive_cost: u64,

    /// Pool capacities.
    pub bullet_capacity: usize,
    pub enemy_capacity: usize,
    pub explosion_capacity: usize,
    pub power_up_capacity: usize,
    pub boss_bullet_capacity: usize,
}

impl ShooterTuning {
    pub fn boss_wave_tick(&self) -> u64 {
        self.wave_ticks * 5
    }
}

impl Default for ShooterTuning {
    fn default() -> Self {
        Self {
            field_width: 1900.0,
            field_height: 1000.0,
            wave_ticks: 1800,
            enemy_timer_easy: 120,
            enemy_timer_medium: 60,
            enemy_timer_hard: 30,
            enemy_timer_nightmare: 5,
            power_up_timer: 1600,
            overdrive_ticks: 90,
            player_speed: 5.0,
            player_health: 100,
            player_hit_box: 8.0,
            fire_cooldown: 5,
            bullet_speed: 15.0,
            starting_lives: 3,
            popcorn_speed: 5.0,
            popcorn_health: 80,
            popcorn_value: 5,
            power_up_speed: 3.0,
            power_up_value: 20,
            boss_health: 2000,
            boss_value: 1000,
            bullet_damage: 10,
            ram_damage: 500,
            boss_bullet_damage: 25,
            boss_ram_damage: 100,
            revive_cost: 500,
            bullet_capacity: 256,
            enemy_capacity: 32,
            explosion_capacity: 32,
            power_up_capacity: 32,
            boss_bullet_capacity: 50,
        }
    }
}
