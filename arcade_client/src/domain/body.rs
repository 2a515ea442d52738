// Shared physical/combat state for every simulated entity.

use super::geometry::{Bounds, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Survived,
    Killed,
    /// The body was already dead; nothing changed.
    AlreadyDead,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32, health: i32) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            width,
            height,
            health,
            max_health: health,
            alive: true,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Subtracts exactly `amount`; the body dies once health reaches zero or below.
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::AlreadyDead;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Survived
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health.max(0) as f32) / (self.max_health as f32)
    }

    /// position += velocity * dt
    pub fn integrate(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    pub fn clamp_to(&mut self, bounds: Bounds) {
        let (x, y) = bounds.clamp_box(self.x, self.y, self.width, self.height);
        self.x = x;
        self.y = y;
    }
}

/// Common view over ship-like entities; variants add their own behaviour.
pub trait Ship {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        self.body_mut().take_damage(amount)
    }

    fn is_alive(&self) -> bool {
        self.body().alive
    }

    fn rect(&self) -> Rect {
        self.body().rect()
    }
}
