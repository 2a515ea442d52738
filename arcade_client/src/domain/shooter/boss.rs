// Boss state machine.
//
// Phase is derived from remaining health and only ever moves forward, one step per tick.
// Each phase fixes a movement profile and a firing pattern.

use std::f32::consts::TAU;

use crate::domain::animation::FrameCycle;
use crate::domain::body::{Body, Ship};
use crate::domain::geometry::Bounds;
use crate::domain::tuning::shooter::ShooterTuning;

pub const BOSS_WIDTH: f32 = 128.0;
pub const BOSS_HEIGHT: f32 = 96.0;
pub const BOSS_NAME: &str = "DESTROYER";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovePattern {
    /// Rise for `rise_ticks`, sink for `sink_ticks`, repeat.
    Bob {
        rise_ticks: u32,
        sink_ticks: u32,
        speed: f32,
    },
    /// Sine sweep around mid-field.
    Sweep { amplitude: f32, rate: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShootPattern {
    Aimed { speed: f32 },
    Spread { count: u32, step: f32, speed: f32 },
    Ring { count: u32, speed: f32 },
}

impl BossPhase {
    pub fn number(self) -> u8 {
        match self {
            BossPhase::One => 1,
            BossPhase::Two => 2,
            BossPhase::Three => 3,
        }
    }

    pub fn move_pattern(self) -> MovePattern {
        match self {
            BossPhase::One => MovePattern::Bob {
                rise_ticks: 120,
                sink_ticks: 120,
                speed: 2.0,
            },
            BossPhase::Two => MovePattern::Bob {
                rise_ticks: 80,
                sink_ticks: 80,
                speed: 3.0,
            },
            BossPhase::Three => MovePattern::Sweep {
                amplitude: 100.0,
                rate: 0.1,
            },
        }
    }

    pub fn shoot_pattern(self) -> ShootPattern {
        match self {
            BossPhase::One => ShootPattern::Aimed { speed: 4.0 },
            BossPhase::Two => ShootPattern::Spread {
                count: 3,
                step: 0.3,
                speed: 4.0,
            },
            BossPhase::Three => ShootPattern::Ring {
                count: 8,
                speed: 3.0,
            },
        }
    }

    /// Ticks between volleys.
    pub fn shoot_cooldown(self) -> u32 {
        match self {
            BossPhase::One => 60,
            BossPhase::Two => 30,
            BossPhase::Three => 15,
        }
    }

    /// The phase to enter from `self` at `health_fraction`, if any.
    fn next(self, health_fraction: f32) -> Option<BossPhase> {
        match self {
            BossPhase::One if health_fraction < 0.66 => Some(BossPhase::Two),
            BossPhase::Two if health_fraction < 0.33 => Some(BossPhase::Three),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossShot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BossUpdate {
    pub shots: Vec<BossShot>,
    /// Set only on the tick a new phase was entered.
    pub entered: Option<BossPhase>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boss {
    pub body: Body,
    pub phase: BossPhase,
    pub value: u64,
    pub move_timer: u32,
    pub shoot_timer: u32,
    pub frames: FrameCycle,
    pub hit: bool,
}

impl Boss {
    pub fn new(x: f32, y: f32, tuning: &ShooterTuning) -> Self {
        Self {
            body: Body::new(x, y, BOSS_WIDTH, BOSS_HEIGHT, tuning.boss_health),
            phase: BossPhase::One,
            value: tuning.boss_value,
            move_timer: 0,
            shoot_timer: 0,
            frames: FrameCycle::new(12, 2),
            hit: false,
        }
    }

    /// Enters near the right edge, vertically centred.
    pub fn spawn(tuning: &ShooterTuning) -> Self {
        Self::new(
            tuning.field_width - 150.0,
            tuning.field_height / 2.0 - BOSS_HEIGHT / 2.0,
            tuning,
        )
    }

    pub fn move_pattern(&self) -> MovePattern {
        self.phase.move_pattern()
    }

    pub fn shoot_pattern(&self) -> ShootPattern {
        self.phase.shoot_pattern()
    }

    /// One tick of movement and firing. `target` is the player's centre while alive.
    pub fn update(&mut self, target: Option<(f32, f32)>, field: Bounds) -> BossUpdate {
        let mut out = BossUpdate::default();
        if !self.body.alive {
            return out;
        }

        self.move_timer += 1;
        self.shoot_timer += 1;
        self.hit = false;

        match self.move_pattern() {
            MovePattern::Bob {
                rise_ticks,
                sink_ticks,
                speed,
            } => {
                if self.move_timer < rise_ticks {
                    self.body.y -= speed;
                } else if self.move_timer < rise_ticks + sink_ticks {
                    self.body.y += speed;
                } else {
                    self.move_timer = 0;
                }
            }
            MovePattern::Sweep { amplitude, rate } => {
                self.body.y = field.height / 2.0 + (self.move_timer as f32 * rate).sin() * amplitude;
            }
        }
        self.body.clamp_to(field);

        if self.shoot_timer >= self.phase.shoot_cooldown() {
            self.shoot_timer = 0;
            out.shots = self.volley(target);
        }

        if let Some(next) = self.phase.next(self.body.health_fraction()) {
            self.phase = next;
            out.entered = Some(next);
        }

        self.frames.advance();
        out
    }

    fn volley(&self, target: Option<(f32, f32)>) -> Vec<BossShot> {
        let muzzle_x = self.body.x;
        let muzzle_y = self.body.y + self.body.height / 2.0;
        let aim = |speed: f32, offset: f32| {
            target.map(|(tx, ty)| {
                let angle = (ty - muzzle_y).atan2(tx - muzzle_x) + offset;
                BossShot {
                    x: muzzle_x,
                    y: muzzle_y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                }
            })
        };

        match self.shoot_pattern() {
            ShootPattern::Aimed { speed } => aim(speed, 0.0).into_iter().collect(),
            ShootPattern::Spread { count, step, speed } => {
                let half = (count as i32 - 1) / 2;
                (-half..=half)
                    .filter_map(|i| aim(speed, i as f32 * step))
                    .collect()
            }
            ShootPattern::Ring { count, speed } => {
                let (cx, cy) = self.body.rect().center();
                (0..count)
                    .map(|i| {
                        let angle = i as f32 / count as f32 * TAU;
                        BossShot {
                            x: cx,
                            y: cy,
                            vx: angle.cos() * speed,
                            vy: angle.sin() * speed,
                        }
                    })
                    .collect()
            }
        }
    }
}

impl Ship for Boss {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}
