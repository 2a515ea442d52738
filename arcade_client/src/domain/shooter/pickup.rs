use crate::domain::animation::FrameCycle;
use crate::domain::geometry::Rect;
use crate::domain::pool::Poolable;

pub const POWER_UP_SIZE: f32 = 16.0;
pub const EXPLOSION_DRIFT: f32 = 2.0;

/// Floats left along a cosine path; collecting one raises the player's power level.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Phase of the float, advanced every tick.
    pub timer: f32,
    pub frames: FrameCycle,
    pub alive: bool,
}

impl Default for PowerUp {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: POWER_UP_SIZE,
            timer: 0.0,
            frames: FrameCycle::new(7, 4),
            alive: false,
        }
    }
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }

    pub fn update(&mut self, speed: f32, field_height: f32) {
        let mid = (field_height - self.size) * 0.5;
        self.y = mid + self.timer.cos() * mid;
        self.timer += 0.03;
        self.x -= speed;
        self.frames.advance();
        if self.x + self.size <= 0.0 {
            self.alive = false;
        }
    }
}

impl Poolable for PowerUp {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.frames.reset();
    }
}

/// Animated explosion that drifts with the scroll and frees itself after one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub frames: FrameCycle,
    pub alive: bool,
}

impl Default for Explosion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            frames: FrameCycle::new(12, 4),
            alive: false,
        }
    }
}

impl Explosion {
    pub fn update(&mut self) {
        self.x -= EXPLOSION_DRIFT;
        if self.frames.advance() {
            self.alive = false;
            self.frames.reset();
        }
    }
}

impl Poolable for Explosion {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.frames.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_all_frames_have_played_then_explosion_frees_itself() {
        let mut explosion = Explosion {
            x: 100.0,
            alive: true,
            ..Explosion::default()
        };
        for _ in 0..47 {
            explosion.update();
            assert!(explosion.alive);
        }
        explosion.update();
        assert!(!explosion.alive);
        assert_eq!(explosion.x, 100.0 - 48.0 * EXPLOSION_DRIFT);
    }

    #[test]
    fn when_power_up_floats_then_it_stays_inside_the_field() {
        let mut power_up = PowerUp {
            x: 1900.0,
            alive: true,
            ..PowerUp::default()
        };
        for _ in 0..400 {
            power_up.update(3.0, 1000.0);
            assert!(power_up.y >= 0.0 && power_up.y <= 1000.0 - POWER_UP_SIZE + 1e-3);
        }
    }
}
