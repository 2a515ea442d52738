use crate::domain::animation::FrameCycle;
use crate::domain::body::{Body, Ship};
use crate::domain::geometry::{Bounds, Rect};
use crate::domain::input::InputState;
use crate::domain::tuning::shooter::ShooterTuning;

use super::projectile::{PLAYER_BULLET_HEIGHT, PLAYER_BULLET_WIDTH};

pub const PLAYER_SIZE: f32 = 32.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerShip {
    pub body: Body,
    pub power_level: u32,
    /// Counts up to the fire cooldown; a volley fires when they match.
    pub bullet_timer: u32,
    /// Thruster flame, shown while moving right.
    pub burning: bool,
    pub frames: FrameCycle,
}

impl PlayerShip {
    pub fn new(x: f32, y: f32, tuning: &ShooterTuning) -> Self {
        Self {
            body: Body::new(x, y, PLAYER_SIZE, PLAYER_SIZE, tuning.player_health),
            power_level: 1,
            bullet_timer: tuning.fire_cooldown,
            burning: false,
            frames: FrameCycle::new(10, 4),
        }
    }

    /// Fresh ship at the left edge, vertically centred.
    pub fn spawn(tuning: &ShooterTuning) -> Self {
        Self::new(20.0, (tuning.field_height * 0.5).floor(), tuning)
    }

    /// Small centred box used for everything that can hurt the player.
    pub fn hit_box(&self, tuning: &ShooterTuning) -> Rect {
        self.body.rect().centered_box(tuning.player_hit_box)
    }

    pub fn steer(&mut self, input: &InputState, speed: f32, bounds: Bounds) {
        self.body.vx = input.horizontal_axis() * speed;
        self.body.vy = input.vertical_axis() * speed;
        self.burning = input.right && !input.left;
        self.body.integrate(1.0);
        self.body.clamp_to(bounds);
    }

    /// Advances the fire timer; true when a volley goes out this tick.
    pub fn trigger(&mut self, firing: bool, cooldown: u32) -> bool {
        if !firing {
            return false;
        }
        if self.bullet_timer >= cooldown {
            self.bullet_timer = 0;
            true
        } else {
            self.bullet_timer += 1;
            false
        }
    }

    /// Muzzle positions for the current power level, in firing order.
    pub fn volley(&self) -> Vec<(f32, f32)> {
        let x = self.body.x + self.body.width - PLAYER_BULLET_WIDTH;
        let y = self.body.y + self.body.height * 0.5 - PLAYER_BULLET_HEIGHT * 0.5;
        let mut slots = match self.power_level {
            0 | 1 => vec![(x, y)],
            2 => vec![(x, y - 6.0), (x, y + 6.0)],
            _ => vec![(x, y - 12.0), (x + 8.0, y), (x, y + 12.0)],
        };
        if self.power_level >= 5 {
            slots.push((x - 8.0, y - 24.0));
            slots.push((x - 8.0, y + 24.0));
        }
        slots
    }

    /// Bullet speed grows with power, capped at +20.
    pub fn bullet_speed(&self, base: f32) -> f32 {
        base + (self.power_level as f32 * 2.0).min(20.0)
    }
}

impl Ship for PlayerShip {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
