use crate::domain::animation::FrameCycle;
use crate::domain::body::{Body, Ship};
use crate::domain::pool::Poolable;
use crate::domain::tuning::shooter::ShooterTuning;

pub const POPCORN_SIZE: f32 = 32.0;

/// The basic enemy: flies straight left and dies off-screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Popcorn {
    pub body: Body,
    pub speed: f32,
    pub value: u64,
    pub frames: FrameCycle,
    /// Set on the tick the enemy was hit, for the flash effect.
    pub hit: bool,
}

impl Popcorn {
    pub fn new(tuning: &ShooterTuning) -> Self {
        Self {
            body: Body::new(
                tuning.field_width,
                0.0,
                POPCORN_SIZE,
                POPCORN_SIZE,
                tuning.popcorn_health,
            ),
            speed: tuning.popcorn_speed,
            value: tuning.popcorn_value,
            frames: FrameCycle::new(12, 4),
            hit: false,
        }
    }

    pub fn update(&mut self) {
        self.body.vx = -self.speed;
        self.body.integrate(1.0);
        self.frames.advance();
        self.hit = false;
        if self.body.x + self.body.width <= 0.0 {
            self.body.alive = false;
        }
    }
}

impl Ship for Popcorn {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Poolable for Popcorn {
    fn is_alive(&self) -> bool {
        self.body.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.body.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.body.health = self.body.max_health;
        self.body.vx = 0.0;
        self.body.vy = 0.0;
        self.frames.reset();
        self.hit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::Pool;

    #[test]
    fn when_recycled_then_popcorn_comes_back_at_full_health() {
        let tuning = ShooterTuning::default();
        let mut pool = Pool::with_capacity(1, || Popcorn::new(&tuning));
        let enemy = pool.acquire().expect("slot");
        enemy.take_damage(70);
        enemy.frames.advance();
        pool.release(0);

        let enemy = pool.acquire().expect("slot");
        assert_eq!(enemy.body.health, 80);
        assert_eq!(enemy.body.width, POPCORN_SIZE);
        assert_eq!(enemy.frames.frame, 0);
    }

    #[test]
    fn when_popcorn_passes_left_edge_then_it_dies() {
        let tuning = ShooterTuning::default();
        let mut enemy = Popcorn::new(&tuning);
        enemy.body.x = -28.0;
        enemy.update();
        assert!(!enemy.body.alive);
    }
}
