use crate::domain::geometry::{Bounds, Rect};
use crate::domain::pool::Poolable;

pub const PLAYER_BULLET_WIDTH: f32 = 16.0;
pub const PLAYER_BULLET_HEIGHT: f32 = 8.0;
pub const BOSS_BULLET_SIZE: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub alive: bool,
}

impl Default for PlayerBullet {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: PLAYER_BULLET_WIDTH,
            height: PLAYER_BULLET_HEIGHT,
            alive: false,
        }
    }
}

impl PlayerBullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn update(&mut self, speed: f32, field_width: f32) {
        self.x += speed;
        if self.x > field_width || self.x < -self.width {
            self.alive = false;
        }
    }
}

impl Poolable for PlayerBullet {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct BossBullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub alive: bool,
}

impl Default for BossBullet {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            size: BOSS_BULLET_SIZE,
            alive: false,
        }
    }
}

impl BossBullet {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    pub fn update(&mut self, field: Bounds) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < -self.size
            || self.x > field.width + self.size
            || self.y < -self.size
            || self.y > field.height + self.size
        {
            self.alive = false;
        }
    }
}

impl Poolable for BossBullet {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}
