/// Gameplay tuning for pong.
///
/// Velocities are expressed per tick (one tick = 1/60 s) because the server speaks in
/// those units.

#[derive(Debug, Clone, Copy)]
pub struct PongTuning {
    /// Field size in pixels.
    pub field_width: f32,
    pub field_height: f32,

    /// Paddle size in pixels.
    pub paddle_width: f32,
    pub paddle_height: f32,

    /// Paddle movement per tick from keyboard input.
    pub paddle_speed: f32,

    /// Multiplier applied to vertical drag gestures.
    pub drag_sensitivity: f32,

    /// Ball radius in pixels; also the vertical bounce margin.
    pub ball_radius: f32,

    /// Horizontal ball speed after a serve.
    pub serve_speed_x: f32,

    /// Serves pick a vertical speed in `[-serve_spread_y / 2, serve_spread_y / 2)`.
    pub serve_spread_y: f32,

    /// Paddle hits add a vertical jitter in `[-paddle_jitter / 2, paddle_jitter / 2)`.
    pub paddle_jitter: f32,

    /// Points needed to win a match.
    pub win_score: u32,

    /// Bot paddle speed per tick.
    pub bot_speed: f32,

    /// Bot ignores the ball while it is within this distance of the paddle centre.
    pub bot_dead_zone: f32,
}

impl PongTuning {
    pub fn max_paddle_y(&self) -> f32 {
        self.field_height - self.paddle_height
    }

    pub fn center_paddle_y(&self) -> f32 {
        (self.field_height - self.paddle_height) / 2.0
    }
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            field_width: 800.0,
            field_height: 500.0,
            paddle_width: 12.0,
            paddle_height: 90.0,
            paddle_speed: 8.0,
            drag_sensitivity: 3.0,
            ball_radius: 6.0,
            serve_speed_x: 7.0,
            serve_spread_y: 8.0,
            paddle_jitter: 2.0,
            win_score: 10,
            bot_speed: 4.0,
            bot_dead_zone: 10.0,
        }
    }
}
