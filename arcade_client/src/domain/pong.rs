// Pong rules as a single pure step function.
//
// The offline demo driver calls `step` every tick. An authoritative server would run the
// same function, so the rules exist in exactly one place.

use super::input::InputState;
use super::tuning::pong::PongTuning;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Player numbers as used on the wire: 1 is the left paddle, 2 the right one.
    pub fn from_player_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Side::Left),
            2 => Some(Side::Right),
            _ => None,
        }
    }

    pub fn player_number(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PongState {
    pub ball_x: f32,
    pub ball_y: f32,
    pub ball_speed_x: f32,
    pub ball_speed_y: f32,
    pub player1_y: f32,
    pub player2_y: f32,
    pub player1_score: u32,
    pub player2_score: u32,
    pub game_active: bool,
    pub player1_name: String,
    pub player2_name: String,
}

impl PongState {
    pub fn new(tuning: &PongTuning) -> Self {
        Self {
            ball_x: tuning.field_width / 2.0,
            ball_y: tuning.field_height / 2.0,
            ball_speed_x: tuning.serve_speed_x,
            ball_speed_y: tuning.serve_speed_x,
            player1_y: tuning.center_paddle_y(),
            player2_y: tuning.center_paddle_y(),
            player1_score: 0,
            player2_score: 0,
            game_active: false,
            player1_name: "Player 1".to_string(),
            player2_name: "Player 2".to_string(),
        }
    }

    pub fn paddle_y(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.player1_y,
            Side::Right => self.player2_y,
        }
    }

    pub fn set_paddle_y(&mut self, side: Side, y: f32) {
        match side {
            Side::Left => self.player1_y = y,
            Side::Right => self.player2_y = y,
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.player1_score,
            Side::Right => self.player2_score,
        }
    }

    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.player1_name,
            Side::Right => &self.player2_name,
        }
    }

    pub fn winner(&self, tuning: &PongTuning) -> Option<Side> {
        if self.player1_score >= tuning.win_score {
            Some(Side::Left)
        } else if self.player2_score >= tuning.win_score {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Back to 0:0 with centred paddles and a fresh serve.
    pub fn restart(&mut self, tuning: &PongTuning, rng: &mut impl Rng) {
        self.player1_score = 0;
        self.player2_score = 0;
        self.player1_y = tuning.center_paddle_y();
        self.player2_y = tuning.center_paddle_y();
        self.game_active = true;
        serve(self, tuning, rng);
    }
}

/// New paddle positions requested by the drivers for this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PongInput {
    pub player1_y: Option<f32>,
    pub player2_y: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PongEvent {
    PaddleHit(Side),
    Scored(Side),
    MatchWon(Side),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PongStep {
    pub state: PongState,
    pub events: Vec<PongEvent>,
}

/// Advances the match by `dt` ticks. Inactive matches are returned unchanged.
pub fn step(
    state: &PongState,
    input: &PongInput,
    dt: f32,
    tuning: &PongTuning,
    rng: &mut impl Rng,
) -> PongStep {
    let mut next = state.clone();
    let mut events = Vec::new();
    if !next.game_active {
        return PongStep {
            state: next,
            events,
        };
    }

    if let Some(y) = input.player1_y {
        next.player1_y = clamp_paddle(y, tuning);
    }
    if let Some(y) = input.player2_y {
        next.player2_y = clamp_paddle(y, tuning);
    }

    next.ball_x += next.ball_speed_x * dt;
    next.ball_y += next.ball_speed_y * dt;

    let top = tuning.ball_radius;
    let bottom = tuning.field_height - tuning.ball_radius;
    if next.ball_y <= top {
        next.ball_speed_y = next.ball_speed_y.abs();
    } else if next.ball_y >= bottom {
        next.ball_speed_y = -next.ball_speed_y.abs();
    }

    let reach = tuning.paddle_width + tuning.ball_radius;
    if next.ball_x <= reach && covers(next.player1_y, next.ball_y, tuning) {
        next.ball_speed_x = next.ball_speed_x.abs();
        next.ball_speed_y += jitter(tuning.paddle_jitter, rng);
        events.push(PongEvent::PaddleHit(Side::Left));
    }
    if next.ball_x >= tuning.field_width - reach && covers(next.player2_y, next.ball_y, tuning) {
        next.ball_speed_x = -next.ball_speed_x.abs();
        next.ball_speed_y += jitter(tuning.paddle_jitter, rng);
        events.push(PongEvent::PaddleHit(Side::Right));
    }

    if next.ball_x < 0.0 {
        next.player2_score += 1;
        events.push(PongEvent::Scored(Side::Right));
        serve(&mut next, tuning, rng);
    } else if next.ball_x > tuning.field_width {
        next.player1_score += 1;
        events.push(PongEvent::Scored(Side::Left));
        serve(&mut next, tuning, rng);
    }

    if let Some(winner) = next.winner(tuning) {
        next.game_active = false;
        events.push(PongEvent::MatchWon(winner));
    }

    PongStep {
        state: next,
        events,
    }
}

/// Centres the ball with a random horizontal direction and vertical speed.
pub fn serve(state: &mut PongState, tuning: &PongTuning, rng: &mut impl Rng) {
    state.ball_x = tuning.field_width / 2.0;
    state.ball_y = tuning.field_height / 2.0;
    state.ball_speed_x = if rng.gen_bool(0.5) {
        tuning.serve_speed_x
    } else {
        -tuning.serve_speed_x
    };
    state.ball_speed_y = jitter(tuning.serve_spread_y, rng);
}

/// Bot paddle position for the next tick: chases the ball at a capped speed.
pub fn bot_paddle_y(state: &PongState, side: Side, tuning: &PongTuning) -> f32 {
    let y = state.paddle_y(side);
    let center = y + tuning.paddle_height / 2.0;
    if state.ball_y < center - tuning.bot_dead_zone {
        clamp_paddle(y - tuning.bot_speed, tuning)
    } else if state.ball_y > center + tuning.bot_dead_zone {
        clamp_paddle(y + tuning.bot_speed, tuning)
    } else {
        y
    }
}

/// Own paddle position after applying keys and drag gestures for one tick.
pub fn steer_paddle(y: f32, input: &InputState, tuning: &PongTuning) -> f32 {
    let moved = y
        + input.vertical_axis() * tuning.paddle_speed
        + input.drag_dy * tuning.drag_sensitivity;
    clamp_paddle(moved, tuning)
}

pub fn clamp_paddle(y: f32, tuning: &PongTuning) -> f32 {
    y.clamp(0.0, tuning.max_paddle_y())
}

fn covers(paddle_y: f32, ball_y: f32, tuning: &PongTuning) -> bool {
    ball_y >= paddle_y && ball_y <= paddle_y + tuning.paddle_height
}

fn jitter(spread: f32, rng: &mut impl Rng) -> f32 {
    (rng.r#gen::<f32>() - 0.5) * spread
}
