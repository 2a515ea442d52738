// Tank classes and the local practice arena.
//
// Online matches are simulated by the server; the arena runs the same class rules locally
// against stationary dummies.

use super::body::{Body, DamageOutcome};
use super::geometry::{Bounds, Rect};
use super::input::InputState;
use super::pool::{Pool, Poolable};
use super::tuning::tank::TankTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TankClass {
    Light,
    #[default]
    Medium,
    Heavy,
    Artillery,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankStats {
    /// Pixels per second.
    pub speed: f32,
    pub health: i32,
    /// Multiplier applied to incoming damage.
    pub armor: f32,
    /// Seconds between shots.
    pub fire_rate: f32,
    pub damage: i32,
    /// Hull half-extent in pixels.
    pub size: f32,
}

impl TankClass {
    pub const ALL: [TankClass; 4] = [
        TankClass::Light,
        TankClass::Medium,
        TankClass::Heavy,
        TankClass::Artillery,
    ];

    pub fn stats(self) -> TankStats {
        match self {
            TankClass::Light => TankStats {
                speed: 120.0,
                health: 75,
                armor: 0.8,
                fire_rate: 0.2,
                damage: 20,
                size: 12.0,
            },
            TankClass::Medium => TankStats {
                speed: 80.0,
                health: 100,
                armor: 0.6,
                fire_rate: 0.4,
                damage: 30,
                size: 15.0,
            },
            TankClass::Heavy => TankStats {
                speed: 50.0,
                health: 150,
                armor: 0.4,
                fire_rate: 0.6,
                damage: 35,
                size: 18.0,
            },
            TankClass::Artillery => TankStats {
                speed: 30.0,
                health: 80,
                armor: 0.7,
                fire_rate: 1.0,
                damage: 60,
                size: 16.0,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TankClass::Light => "light",
            TankClass::Medium => "medium",
            TankClass::Heavy => "heavy",
            TankClass::Artillery => "artillery",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str().eq_ignore_ascii_case(value))
    }
}

/// Damage after armor, truncated to whole hit points.
pub fn armored_damage(raw: i32, armor: f32) -> i32 {
    (raw as f32 * armor) as i32
}

/// A tank; `body.x`/`body.y` is the hull centre.
#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub id: String,
    pub name: String,
    pub class: TankClass,
    pub body: Body,
    pub angle: f32,
    pub kills: u32,
    pub deaths: u32,
    pub team: Option<String>,
    pub spawn: (f32, f32),
    pub fire_cooldown: f32,
    pub respawn_timer: f32,
}

impl Tank {
    pub fn new(id: impl Into<String>, name: impl Into<String>, class: TankClass, x: f32, y: f32) -> Self {
        let stats = class.stats();
        Self {
            id: id.into(),
            name: name.into(),
            class,
            body: Body::new(x, y, stats.size * 2.0, stats.size * 2.0, stats.health),
            angle: 0.0,
            kills: 0,
            deaths: 0,
            team: None,
            spawn: (x, y),
            fire_cooldown: 0.0,
            respawn_timer: 0.0,
        }
    }

    pub fn stats(&self) -> TankStats {
        self.class.stats()
    }

    pub fn hull(&self) -> Rect {
        let size = self.stats().size;
        Rect::new(self.body.x - size, self.body.y - size, size * 2.0, size * 2.0)
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        self.body.take_damage(amount)
    }

    pub fn is_alive(&self) -> bool {
        self.body.alive
    }

    fn respawn(&mut self) {
        let stats = self.stats();
        self.body.x = self.spawn.0;
        self.body.y = self.spawn.1;
        self.body.health = stats.health;
        self.body.max_health = stats.health;
        self.body.alive = true;
        self.angle = 0.0;
        self.fire_cooldown = 0.0;
        self.respawn_timer = 0.0;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shell {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Index of the firing tank in the arena.
    pub owner: usize,
    pub life: f32,
    pub alive: bool,
}

impl Poolable for Shell {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.life = 0.0;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blast {
    pub x: f32,
    pub y: f32,
    pub age: f32,
    pub alive: bool,
}

impl Poolable for Blast {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    fn reset_transient(&mut self) {
        self.age = 0.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaEvent {
    Fired { tank: usize },
    Hit { target: usize, damage: i32 },
    Destroyed { target: usize, by: Option<usize> },
    Respawned { tank: usize },
}

/// Local practice match: the player's tank is index 0, the rest are dummies.
#[derive(Debug, Clone)]
pub struct TankArena {
    pub tuning: TankTuning,
    pub tanks: Vec<Tank>,
    pub shells: Pool<Shell>,
    pub blasts: Pool<Blast>,
    pub obstacles: Vec<Rect>,
}

pub const PLAYER: usize = 0;

impl TankArena {
    pub fn new(tuning: TankTuning, player: Tank) -> Self {
        Self {
            shells: Pool::with_capacity(tuning.bullet_capacity, Shell::default),
            blasts: Pool::with_capacity(tuning.explosion_capacity, Blast::default),
            tuning,
            tanks: vec![player],
            obstacles: Vec::new(),
        }
    }

    /// Player on the left, three medium dummies on the right and a few walls between them.
    pub fn practice(tuning: TankTuning, name: &str, class: TankClass) -> Self {
        let mut arena = Self::new(tuning, Tank::new("player", name, class, 100.0, 300.0));
        for (index, (x, y)) in [(600.0, 150.0), (650.0, 300.0), (600.0, 450.0)]
            .into_iter()
            .enumerate()
        {
            let mut dummy = Tank::new(
                format!("dummy-{}", index + 1),
                format!("Dummy {}", index + 1),
                TankClass::Medium,
                x,
                y,
            );
            dummy.angle = std::f32::consts::PI;
            arena.tanks.push(dummy);
        }
        arena.obstacles = vec![
            Rect::new(300.0, 100.0, 40.0, 120.0),
            Rect::new(300.0, 380.0, 40.0, 120.0),
            Rect::new(450.0, 270.0, 60.0, 60.0),
        ];
        arena
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.tuning.arena_width, self.tuning.arena_height)
    }

    pub fn player(&self) -> Option<&Tank> {
        self.tanks.get(PLAYER)
    }

    /// Advances the arena by `dt` seconds with `input` driving the player's tank.
    pub fn step(&mut self, input: &InputState, dt: f32) -> Vec<ArenaEvent> {
        let mut events = Vec::new();

        self.drive(PLAYER, input, dt);
        self.tick_weapons(input, dt, &mut events);
        self.move_shells(dt, &mut events);
        self.tick_respawns(dt, &mut events);

        let lifetime = self.tuning.explosion_seconds;
        for blast in self.blasts.iter_alive_mut() {
            blast.age += dt;
            if blast.age >= lifetime {
                blast.alive = false;
            }
        }

        events
    }

    /// Applies already-armored damage to a tank; a kill spawns exactly one explosion.
    pub fn apply_damage(&mut self, target: usize, amount: i32, by: Option<usize>) -> DamageOutcome {
        let Some(tank) = self.tanks.get_mut(target) else {
            return DamageOutcome::AlreadyDead;
        };
        let outcome = tank.take_damage(amount);
        if outcome == DamageOutcome::Killed {
            tank.deaths += 1;
            tank.respawn_timer = self.tuning.respawn_seconds;
            let (x, y) = (tank.body.x, tank.body.y);
            if let Some(blast) = self.blasts.acquire() {
                blast.x = x;
                blast.y = y;
            }
            if let Some(killer) = by.filter(|&index| index != target) {
                if let Some(killer) = self.tanks.get_mut(killer) {
                    killer.kills += 1;
                }
            }
        }
        outcome
    }

    fn drive(&mut self, index: usize, input: &InputState, dt: f32) {
        let bounds = self.bounds();
        let rotation_speed = self.tuning.rotation_speed;
        let reverse_factor = self.tuning.reverse_factor;
        let Some(tank) = self.tanks.get_mut(index) else {
            return;
        };
        if !tank.is_alive() {
            return;
        }
        let stats = tank.stats();

        tank.angle += input.horizontal_axis() * rotation_speed * dt;

        let speed = if input.up && !input.down {
            stats.speed
        } else if input.down && !input.up {
            -stats.speed * reverse_factor
        } else {
            0.0
        };
        if speed == 0.0 {
            return;
        }

        let (old_x, old_y) = (tank.body.x, tank.body.y);
        let (x, y) = bounds.clamp_point(
            old_x + tank.angle.cos() * speed * dt,
            old_y + tank.angle.sin() * speed * dt,
            stats.size,
        );
        tank.body.x = x;
        tank.body.y = y;
        let hull = tank.hull();
        if self.obstacles.iter().any(|wall| wall.intersects(&hull)) {
            tank.body.x = old_x;
            tank.body.y = old_y;
        }
    }

    fn tick_weapons(&mut self, input: &InputState, dt: f32, events: &mut Vec<ArenaEvent>) {
        for tank in &mut self.tanks {
            tank.fire_cooldown = (tank.fire_cooldown - dt).max(0.0);
        }

        let Some(tank) = self.tanks.get_mut(PLAYER) else {
            return;
        };
        if !input.fire || !tank.is_alive() || tank.fire_cooldown > 0.0 {
            return;
        }
        let stats = tank.stats();
        let Some(shell) = self.shells.acquire() else {
            return;
        };
        let (dir_x, dir_y) = (tank.angle.cos(), tank.angle.sin());
        shell.x = tank.body.x + dir_x * stats.size;
        shell.y = tank.body.y + dir_y * stats.size;
        shell.vx = dir_x * self.tuning.bullet_speed;
        shell.vy = dir_y * self.tuning.bullet_speed;
        shell.owner = PLAYER;
        shell.life = self.tuning.bullet_life_time;
        tank.fire_cooldown = stats.fire_rate;
        events.push(ArenaEvent::Fired { tank: PLAYER });
    }

    fn move_shells(&mut self, dt: f32, events: &mut Vec<ArenaEvent>) {
        let bounds = self.bounds();
        let radius = self.tuning.bullet_radius;
        let mut hits = Vec::new();

        for shell in self.shells.iter_alive_mut() {
            shell.x += shell.vx * dt;
            shell.y += shell.vy * dt;
            shell.life -= dt;

            let rect = Rect::new(shell.x - radius, shell.y - radius, radius * 2.0, radius * 2.0);
            if shell.life <= 0.0
                || !bounds.contains_box(&rect)
                || self.obstacles.iter().any(|wall| wall.intersects(&rect))
            {
                shell.alive = false;
                continue;
            }

            let target = self.tanks.iter().enumerate().position(|(index, tank)| {
                index != shell.owner && tank.is_alive() && tank.hull().intersects(&rect)
            });
            if let Some(target) = target {
                shell.alive = false;
                hits.push((shell.owner, target));
            }
        }

        for (owner, target) in hits {
            let Some(raw) = self.tanks.get(owner).map(|tank| tank.stats().damage) else {
                continue;
            };
            let Some(armor) = self.tanks.get(target).map(|tank| tank.stats().armor) else {
                continue;
            };
            let damage = armored_damage(raw, armor);
            match self.apply_damage(target, damage, Some(owner)) {
                DamageOutcome::Survived => events.push(ArenaEvent::Hit { target, damage }),
                DamageOutcome::Killed => {
                    events.push(ArenaEvent::Hit { target, damage });
                    events.push(ArenaEvent::Destroyed {
                        target,
                        by: Some(owner),
                    });
                }
                DamageOutcome::AlreadyDead => {}
            }
        }
    }

    fn tick_respawns(&mut self, dt: f32, events: &mut Vec<ArenaEvent>) {
        for (index, tank) in self.tanks.iter_mut().enumerate() {
            if tank.is_alive() {
                continue;
            }
            tank.respawn_timer -= dt;
            if tank.respawn_timer <= 0.0 {
                tank.respawn();
                events.push(ArenaEvent::Respawned { tank: index });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle() -> InputState {
        InputState::default()
    }

    #[test]
    fn when_tank_takes_two_hits_then_third_lethal_hit_spawns_exactly_one_explosion() {
        let mut arena = TankArena::practice(TankTuning::default(), "me", TankClass::Light);
        let dummy = 1;
        assert_eq!(arena.tanks[dummy].body.health, 100);

        assert_eq!(arena.apply_damage(dummy, 20, Some(PLAYER)), DamageOutcome::Survived);
        assert_eq!(arena.apply_damage(dummy, 20, Some(PLAYER)), DamageOutcome::Survived);
        assert_eq!(arena.tanks[dummy].body.health, 60);
        assert!(arena.tanks[dummy].is_alive());
        assert_eq!(arena.blasts.alive_count(), 0);

        assert_eq!(arena.apply_damage(dummy, 60, Some(PLAYER)), DamageOutcome::Killed);
        assert!(!arena.tanks[dummy].is_alive());
        assert_eq!(arena.blasts.alive_count(), 1);

        assert_eq!(arena.apply_damage(dummy, 60, Some(PLAYER)), DamageOutcome::AlreadyDead);
        assert_eq!(arena.blasts.alive_count(), 1);
        assert_eq!(arena.tanks[PLAYER].kills, 1);
        assert_eq!(arena.tanks[dummy].deaths, 1);
    }

    #[test]
    fn when_damage_is_armored_then_it_is_truncated_to_whole_points() {
        assert_eq!(armored_damage(20, 0.6), 12);
        assert_eq!(armored_damage(35, 0.7), 24);
        assert_eq!(armored_damage(60, 0.4), 24);
    }

    #[test]
    fn when_class_name_is_parsed_then_case_is_ignored() {
        assert_eq!(TankClass::parse("Heavy"), Some(TankClass::Heavy));
        assert_eq!(TankClass::parse("scout"), None);
        for class in TankClass::ALL {
            assert_eq!(TankClass::parse(class.as_str()), Some(class));
        }
    }

    #[test]
    fn when_driving_into_the_wall_then_hull_stays_inside_the_arena() {
        let mut arena = TankArena::new(
            TankTuning::default(),
            Tank::new("p", "p", TankClass::Light, 20.0, 300.0),
        );
        arena.tanks[PLAYER].angle = std::f32::consts::PI;
        let forward = InputState {
            up: true,
            ..idle()
        };
        for _ in 0..120 {
            arena.step(&forward, 1.0 / 60.0);
        }
        let tank = &arena.tanks[PLAYER];
        assert!(tank.body.x >= 12.0);
        assert!(tank.body.x <= 800.0 - 12.0);
    }

    #[test]
    fn when_reversing_then_tank_moves_at_half_speed() {
        let mut arena = TankArena::new(
            TankTuning::default(),
            Tank::new("p", "p", TankClass::Medium, 400.0, 300.0),
        );
        let back = InputState {
            down: true,
            ..idle()
        };
        arena.step(&back, 1.0);
        assert!((arena.tanks[PLAYER].body.x - 360.0).abs() < 1e-3);
    }

    #[test]
    fn when_firing_repeatedly_then_class_cooldown_limits_shots() {
        let mut arena = TankArena::new(
            TankTuning::default(),
            Tank::new("p", "p", TankClass::Medium, 100.0, 100.0),
        );
        let fire = InputState {
            fire: true,
            ..idle()
        };
        let mut shots = 0;
        for _ in 0..60 {
            let events = arena.step(&fire, 0.1);
            shots += events
                .iter()
                .filter(|event| matches!(event, ArenaEvent::Fired { .. }))
                .count();
        }
        // 6 seconds at one shot per 0.4 s
        assert!((12..=16).contains(&shots), "shots = {shots}");
    }

    #[test]
    fn when_shell_hits_dummy_then_armored_damage_is_applied() {
        let mut arena = TankArena::new(
            TankTuning::default(),
            Tank::new("p", "p", TankClass::Light, 100.0, 300.0),
        );
        arena
            .tanks
            .push(Tank::new("d", "d", TankClass::Medium, 200.0, 300.0));
        let fire = InputState {
            fire: true,
            ..idle()
        };

        let mut events = arena.step(&fire, 0.01);
        for _ in 0..30 {
            events.extend(arena.step(&idle(), 0.01));
        }

        assert!(events.contains(&ArenaEvent::Hit {
            target: 1,
            damage: 12
        }));
        assert_eq!(arena.tanks[1].body.health, 88);
        assert_eq!(arena.shells.alive_count(), 0);
    }

    #[test]
    fn when_respawn_delay_passes_then_dead_tank_returns_at_full_health() {
        let mut arena = TankArena::practice(TankTuning::default(), "me", TankClass::Light);
        arena.apply_damage(2, 500, None);
        assert!(!arena.tanks[2].is_alive());

        let mut respawned = false;
        for _ in 0..31 {
            let events = arena.step(&idle(), 0.1);
            respawned |= events.contains(&ArenaEvent::Respawned { tank: 2 });
        }

        assert!(respawned);
        assert!(arena.tanks[2].is_alive());
        assert_eq!(arena.tanks[2].body.health, 100);
        assert_eq!(arena.tanks[2].body.x, arena.tanks[2].spawn.0);
    }
}
