// Shooter world: screens, pools, spawning and the per-tick collision pass.
//
// Single player runs everything here. In multiplayer the world only animates; positions,
// health and scores come from server snapshots.

use rand::Rng;

use crate::domain::body::{DamageOutcome, Ship};
use crate::domain::geometry::{Bounds, Rect};
use crate::domain::input::InputState;
use crate::domain::pool::Pool;
use crate::domain::tuning::shooter::ShooterTuning;

use super::backdrop::{Star, star_field};
use super::boss::{Boss, BossPhase};
use super::enemy::Popcorn;
use super::pickup::{Explosion, PowerUp};
use super::player::PlayerShip;
use super::projectile::{BossBullet, PlayerBullet};

pub const STAR_COUNT: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Title,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterEvent {
    Started,
    Volley { bullets: usize },
    EnemyDestroyed,
    BossSpawned,
    BossPhase(BossPhase),
    BossDestroyed,
    PowerUpCollected { level: u32 },
    LifeLost { lives_left: u32 },
    GameOver { score: u64 },
}

/// Another player's ship as last reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePlayer {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    pub score: u64,
}

#[derive(Debug, Clone)]
pub struct ShooterWorld {
    pub tuning: ShooterTuning,
    pub screen: Screen,
    pub tick: u64,
    pub multiplayer: bool,
    /// Intro star streaks.
    pub overdrive: bool,
    pub player: PlayerShip,
    pub bullets: Pool<PlayerBullet>,
    pub enemies: Pool<Popcorn>,
    pub explosions: Pool<Explosion>,
    pub power_ups: Pool<PowerUp>,
    pub boss_bullets: Pool<BossBullet>,
    pub boss: Option<Boss>,
    pub boss_spawned: bool,
    pub score: u64,
    pub lives: u32,
    pub kills: u32,
    pub remote_players: Vec<RemotePlayer>,
    pub stars: Vec<Star>,
}

impl ShooterWorld {
    pub fn new(tuning: ShooterTuning, rng: &mut impl Rng) -> Self {
        Self {
            screen: Screen::Title,
            tick: 0,
            multiplayer: false,
            overdrive: true,
            player: PlayerShip::spawn(&tuning),
            bullets: Pool::with_capacity(tuning.bullet_capacity, PlayerBullet::default),
            enemies: Pool::with_capacity(tuning.enemy_capacity, || Popcorn::new(&tuning)),
            explosions: Pool::with_capacity(tuning.explosion_capacity, Explosion::default),
            power_ups: Pool::with_capacity(tuning.power_up_capacity, PowerUp::default),
            boss_bullets: Pool::with_capacity(tuning.boss_bullet_capacity, BossBullet::default),
            boss: None,
            boss_spawned: false,
            score: 0,
            lives: tuning.starting_lives,
            kills: 0,
            remote_players: Vec::new(),
            stars: star_field(STAR_COUNT, tuning.field_width, tuning.field_height, rng),
            tuning,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.tuning.field_width, self.tuning.field_height)
    }

    pub fn reset_scores(&mut self) {
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.kills = 0;
    }

    /// New game from the title or game-over screen.
    pub fn start(&mut self) {
        self.reset_scores();
        self.begin_round();
    }

    /// Fresh round: scores carry over, every pool is emptied.
    pub fn begin_round(&mut self) {
        self.screen = Screen::Playing;
        self.tick = 0;
        self.overdrive = !self.multiplayer;
        self.player = PlayerShip::spawn(&self.tuning);
        self.bullets.kill_all();
        self.enemies.kill_all();
        self.explosions.kill_all();
        self.power_ups.kill_all();
        self.boss_bullets.kill_all();
        self.boss = None;
        self.boss_spawned = false;
        self.remote_players.clear();
    }

    pub fn enter_multiplayer(&mut self) {
        self.multiplayer = true;
        self.start();
    }

    pub fn back_to_title(&mut self) {
        self.multiplayer = false;
        self.screen = Screen::Title;
        self.overdrive = true;
        self.remote_players.clear();
    }

    /// Spends the revive cost; false when the score cannot cover it.
    pub fn spend_revive(&mut self) -> bool {
        if self.score < self.tuning.revive_cost {
            return false;
        }
        self.score -= self.tuning.revive_cost;
        true
    }

    pub fn dead_teammates(&self) -> usize {
        self.remote_players.iter().filter(|p| !p.alive).count()
    }

    pub fn enemy_timer(&self) -> u64 {
        let wave = self.tuning.wave_ticks;
        if self.tick > wave * 4 {
            self.tuning.enemy_timer_nightmare
        } else if self.tick > wave * 3 {
            self.tuning.enemy_timer_hard
        } else if self.tick > wave * 2 {
            self.tuning.enemy_timer_medium
        } else {
            self.tuning.enemy_timer_easy
        }
    }

    pub fn step(&mut self, input: &InputState, rng: &mut impl Rng) -> Vec<ShooterEvent> {
        let mut events = Vec::new();
        let (width, overdrive) = (self.tuning.field_width, self.overdrive);
        for star in &mut self.stars {
            star.update(overdrive, width);
        }

        match self.screen {
            Screen::Title => {
                if input.reset {
                    self.reset_scores();
                }
                if input.start {
                    self.start();
                    events.push(ShooterEvent::Started);
                }
            }
            Screen::GameOver => {
                if input.start {
                    self.start();
                    events.push(ShooterEvent::Started);
                }
            }
            Screen::Playing if self.multiplayer => self.animate(),
            Screen::Playing => self.simulate(input, rng, &mut events),
        }
        events
    }

    /// Cosmetic updates only; used while the server owns the simulation.
    fn animate(&mut self) {
        self.overdrive = false;
        self.player.frames.advance();
        for explosion in self.explosions.iter_alive_mut() {
            explosion.update();
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.frames.advance();
        }
    }

    fn simulate(&mut self, input: &InputState, rng: &mut impl Rng, events: &mut Vec<ShooterEvent>) {
        if !self.player.is_alive() && input.start {
            self.begin_round();
            events.push(ShooterEvent::Started);
            return;
        }

        if self.tick > self.tuning.overdrive_ticks {
            self.overdrive = false;
        }
        self.tick += 1;

        self.deploy_enemy(rng);
        self.deploy_power_up(rng);
        if !self.boss_spawned && self.tick > self.tuning.boss_wave_tick() {
            self.boss = Some(Boss::spawn(&self.tuning));
            self.boss_spawned = true;
            events.push(ShooterEvent::BossSpawned);
        }

        self.update_entities(input, events);
        self.update_boss(events);
        self.resolve_collisions(events);
    }

    fn deploy_enemy(&mut self, rng: &mut impl Rng) {
        if self.boss.as_ref().is_some_and(|boss| boss.is_alive()) {
            return;
        }
        if self.tick % self.enemy_timer() != 0 {
            return;
        }
        let (width, height) = (self.tuning.field_width, self.tuning.field_height);
        if let Some(enemy) = self.enemies.acquire() {
            enemy.body.x = width;
            enemy.body.y = (height * rng.r#gen::<f32>() - enemy.body.height).max(4.0);
        }
    }

    fn deploy_power_up(&mut self, rng: &mut impl Rng) {
        if self.tick % self.tuning.power_up_timer != 0 || rng.r#gen::<f32>() < 0.01 {
            return;
        }
        let (width, height) = (self.tuning.field_width, self.tuning.field_height);
        if let Some(power_up) = self.power_ups.acquire() {
            power_up.x = width;
            power_up.y = rng.r#gen::<f32>() * (height - power_up.size);
            power_up.timer = rng.gen_range(0.0..256.0);
        }
    }

    fn update_entities(&mut self, input: &InputState, events: &mut Vec<ShooterEvent>) {
        let bounds = self.bounds();
        if self.player.is_alive() {
            self.player.steer(input, self.tuning.player_speed, bounds);
            if self.player.trigger(input.fire, self.tuning.fire_cooldown) {
                let mut fired = 0;
                for (x, y) in self.player.volley() {
                    let Some(bullet) = self.bullets.acquire() else {
                        break;
                    };
                    bullet.x = x;
                    bullet.y = y;
                    fired += 1;
                }
                if fired > 0 {
                    events.push(ShooterEvent::Volley { bullets: fired });
                }
            }
        }
        self.player.frames.advance();

        let bullet_speed = self.player.bullet_speed(self.tuning.bullet_speed);
        for bullet in self.bullets.iter_alive_mut() {
            bullet.update(bullet_speed, bounds.width);
        }
        for enemy in self.enemies.iter_alive_mut() {
            enemy.update();
        }
        for explosion in self.explosions.iter_alive_mut() {
            explosion.update();
        }
        let power_up_speed = self.tuning.power_up_speed;
        for power_up in self.power_ups.iter_alive_mut() {
            power_up.update(power_up_speed, bounds.height);
        }
        for shot in self.boss_bullets.iter_alive_mut() {
            shot.update(bounds);
        }
    }

    fn update_boss(&mut self, events: &mut Vec<ShooterEvent>) {
        let target = self
            .player
            .is_alive()
            .then(|| self.player.body.rect().center());
        let bounds = self.bounds();
        let Some(boss) = self.boss.as_mut() else {
            return;
        };

        let update = boss.update(target, bounds);
        if let Some(phase) = update.entered {
            events.push(ShooterEvent::BossPhase(phase));
        }
        for shot in update.shots {
            let Some(bullet) = self.boss_bullets.acquire() else {
                break;
            };
            bullet.x = shot.x;
            bullet.y = shot.y;
            bullet.vx = shot.vx;
            bullet.vy = shot.vy;
        }
    }

    fn resolve_collisions(&mut self, events: &mut Vec<ShooterEvent>) {
        let bullet_damage = self.tuning.bullet_damage;
        let mut boss_down = false;

        for bullet in self.bullets.iter_alive_mut() {
            let rect = bullet.rect();
            for enemy in self.enemies.iter_alive_mut() {
                if !enemy.rect().intersects(&rect) {
                    continue;
                }
                bullet.alive = false;
                enemy.hit = true;
                if enemy.take_damage(bullet_damage) == DamageOutcome::Killed {
                    self.score += enemy.value;
                    self.kills += 1;
                    spawn_explosion(&mut self.explosions, enemy.body.x, enemy.body.y);
                    events.push(ShooterEvent::EnemyDestroyed);
                }
                break;
            }
            if !bullet.alive {
                continue;
            }
            if let Some(boss) = self.boss.as_mut().filter(|boss| boss.is_alive()) {
                if boss.rect().intersects(&rect) {
                    bullet.alive = false;
                    boss.hit = true;
                    if boss.take_damage(bullet_damage) == DamageOutcome::Killed {
                        self.score += boss.value;
                        self.kills += 1;
                        let (x, y) = boss.rect().center();
                        spawn_explosion(&mut self.explosions, x, y);
                        events.push(ShooterEvent::BossDestroyed);
                        boss_down = true;
                    }
                }
            }
        }
        if boss_down {
            self.boss_bullets.kill_all();
        }

        if !self.player.is_alive() {
            return;
        }
        let hit_box = self.player.hit_box(&self.tuning);
        let (player_x, player_y) = (self.player.body.x, self.player.body.y);

        let ram_damage = self.tuning.ram_damage;
        let mut rammed = false;
        for enemy in self.enemies.iter_alive_mut() {
            if !enemy.rect().intersects(&hit_box) {
                continue;
            }
            self.player.take_damage(ram_damage);
            enemy.take_damage(ram_damage);
            spawn_explosion(&mut self.explosions, enemy.body.x, enemy.body.y);
            spawn_explosion(&mut self.explosions, player_x, player_y);
            rammed = true;
            if !self.player.is_alive() {
                break;
            }
        }
        if rammed && self.lose_life(events) {
            return;
        }

        let shot_damage = self.tuning.boss_bullet_damage;
        let mut shot_hits = 0;
        for shot in self.boss_bullets.iter_alive_mut() {
            if !self.player.is_alive() {
                break;
            }
            if !shot.rect().intersects(&hit_box) {
                continue;
            }
            shot.alive = false;
            self.player.take_damage(shot_damage);
            spawn_explosion(&mut self.explosions, player_x, player_y);
            shot_hits += 1;
        }
        for _ in 0..shot_hits {
            if self.lose_life(events) {
                return;
            }
        }

        if self.player.is_alive() {
            let boss_ram = self.tuning.boss_ram_damage;
            let mut collided = false;
            if let Some(boss) = self.boss.as_mut().filter(|boss| boss.is_alive()) {
                if boss.rect().intersects(&hit_box) {
                    collided = true;
                    self.player.take_damage(ram_damage);
                    spawn_explosion(&mut self.explosions, player_x, player_y);
                    if boss.take_damage(boss_ram) == DamageOutcome::Killed {
                        self.score += boss.value;
                        self.kills += 1;
                        let (x, y) = boss.rect().center();
                        spawn_explosion(&mut self.explosions, x, y);
                        events.push(ShooterEvent::BossDestroyed);
                    }
                }
            }
            if collided && self.lose_life(events) {
                return;
            }
        }

        if !self.player.is_alive() {
            return;
        }
        let value = self.tuning.power_up_value;
        for power_up in self.power_ups.iter_alive_mut() {
            if !power_up.rect().intersects(&hit_box) {
                continue;
            }
            power_up.alive = false;
            self.player.power_level += 1;
            self.score += value;
            events.push(ShooterEvent::PowerUpCollected {
                level: self.player.power_level,
            });
        }
    }

    /// Returns true when the last life is gone and the game is over.
    fn lose_life(&mut self, events: &mut Vec<ShooterEvent>) -> bool {
        self.lives = self.lives.saturating_sub(1);
        events.push(ShooterEvent::LifeLost {
            lives_left: self.lives,
        });
        if self.lives == 0 {
            self.screen = Screen::GameOver;
            events.push(ShooterEvent::GameOver { score: self.score });
            return true;
        }
        false
    }
}

fn spawn_explosion(pool: &mut Pool<Explosion>, x: f32, y: f32) {
    if let Some(explosion) = pool.acquire() {
        explosion.x = x;
        explosion.y = y;
    }
}

impl RemotePlayer {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::Poolable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn playing_world() -> (ShooterWorld, StdRng) {
        let mut rng = StdRng::seed_from_u64(11);
        let mut world = ShooterWorld::new(ShooterTuning::default(), &mut rng);
        world.start();
        (world, rng)
    }

    fn idle() -> InputState {
        InputState::default()
    }

    #[test]
    fn when_enter_is_pressed_on_title_then_a_fresh_game_starts() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut world = ShooterWorld::new(ShooterTuning::default(), &mut rng);
        world.score = 40;
        let start = InputState {
            start: true,
            ..idle()
        };

        let events = world.step(&start, &mut rng);

        assert_eq!(world.screen, Screen::Playing);
        assert_eq!(world.score, 0);
        assert_eq!(world.lives, 3);
        assert_eq!(events, vec![ShooterEvent::Started]);
    }

    #[test]
    fn when_enemy_timer_elapses_then_one_popcorn_enters_from_the_right() {
        let (mut world, mut rng) = playing_world();
        for _ in 0..119 {
            world.step(&idle(), &mut rng);
        }
        assert_eq!(world.enemies.alive_count(), 0);

        world.step(&idle(), &mut rng);

        assert_eq!(world.enemies.alive_count(), 1);
        let enemy = world.enemies.iter_alive().next().expect("spawned enemy");
        assert_eq!(enemy.body.x, world.tuning.field_width - world.tuning.popcorn_speed);
        assert!(enemy.body.y >= 4.0);
    }

    #[test]
    fn when_waves_pass_then_enemy_timer_tightens() {
        let (mut world, _) = playing_world();
        let wave = world.tuning.wave_ticks;
        let timers: Vec<u64> = [0, wave * 2 + 1, wave * 3 + 1, wave * 4 + 1]
            .into_iter()
            .map(|tick| {
                world.tick = tick;
                world.enemy_timer()
            })
            .collect();
        assert_eq!(timers, vec![120, 60, 30, 5]);
    }

    #[test]
    fn when_boss_wave_is_reached_then_boss_spawns_once_and_popcorn_stops() {
        let (mut world, mut rng) = playing_world();
        world.tick = world.tuning.boss_wave_tick();

        let events = world.step(&idle(), &mut rng);
        assert!(events.contains(&ShooterEvent::BossSpawned));
        assert!(world.boss.is_some());

        let mut later = Vec::new();
        for _ in 0..240 {
            later.extend(world.step(&idle(), &mut rng));
        }
        assert!(!later.contains(&ShooterEvent::BossSpawned));
        assert_eq!(world.enemies.alive_count(), 0);
    }

    #[test]
    fn when_bullet_overlaps_enemy_and_boss_then_only_the_enemy_is_hit() {
        let (mut world, mut rng) = playing_world();
        world.tick = world.tuning.boss_wave_tick() + 1;
        world.boss_spawned = true;
        let mut boss = Boss::new(1000.0, 400.0, &world.tuning);
        boss.shoot_timer = 0;
        world.boss = Some(boss);

        let enemy = world.enemies.acquire().expect("enemy slot");
        enemy.body.x = 1005.0;
        enemy.body.y = 450.0;
        let bullet = world.bullets.acquire().expect("bullet slot");
        // lands on x = 1000 after moving
        bullet.x = 1000.0 - 17.0;
        bullet.y = 460.0;

        world.step(&idle(), &mut rng);

        let enemy = world.enemies.iter_alive().next().expect("enemy survives one hit");
        assert_eq!(enemy.body.health, 70);
        let boss = world.boss.as_ref().expect("boss");
        assert_eq!(boss.body.health, world.tuning.boss_health);
        assert_eq!(world.bullets.alive_count(), 0);
    }

    #[test]
    fn when_popcorn_rams_the_player_then_a_life_is_lost_and_enter_respawns() {
        let (mut world, mut rng) = playing_world();
        let enemy = world.enemies.acquire().expect("enemy slot");
        enemy.body.x = 30.0;
        enemy.body.y = 500.0;

        let events = world.step(&idle(), &mut rng);

        assert!(events.contains(&ShooterEvent::LifeLost { lives_left: 2 }));
        assert!(!world.player.is_alive());
        assert_eq!(world.enemies.alive_count(), 0);
        assert_eq!(world.explosions.alive_count(), 2);

        let start = InputState {
            start: true,
            ..idle()
        };
        world.step(&start, &mut rng);
        assert!(world.player.is_alive());
        assert_eq!(world.lives, 2);
        assert_eq!(world.screen, Screen::Playing);
    }

    #[test]
    fn when_last_life_is_lost_then_game_over_screen_is_shown() {
        let (mut world, mut rng) = playing_world();
        world.lives = 1;
        world.score = 75;
        let enemy = world.enemies.acquire().expect("enemy slot");
        enemy.body.x = 30.0;
        enemy.body.y = 500.0;

        let events = world.step(&idle(), &mut rng);

        assert_eq!(world.screen, Screen::GameOver);
        assert!(events.contains(&ShooterEvent::GameOver { score: 75 }));
    }

    #[test]
    fn when_player_touches_power_up_then_power_and_score_rise() {
        let (mut world, mut rng) = playing_world();
        world.player.body.y = 484.0;
        let power_up = world.power_ups.acquire().expect("power-up slot");
        power_up.x = 30.0;
        power_up.timer = std::f32::consts::FRAC_PI_2;

        let events = world.step(&idle(), &mut rng);

        assert_eq!(events, vec![ShooterEvent::PowerUpCollected { level: 2 }]);
        assert_eq!(world.score, 20);
        assert_eq!(world.power_ups.alive_count(), 0);
    }

    #[test]
    fn when_fire_is_held_then_bullets_come_from_the_pool() {
        let (mut world, mut rng) = playing_world();
        let fire = InputState {
            fire: true,
            ..idle()
        };
        let events = world.step(&fire, &mut rng);
        assert_eq!(events, vec![ShooterEvent::Volley { bullets: 1 }]);
        assert_eq!(world.bullets.alive_count(), 1);
        assert!(world.bullets.iter().filter(|b| b.is_alive()).count() == 1);
    }

    #[test]
    fn when_revive_is_requested_then_score_must_cover_the_cost() {
        let (mut world, _) = playing_world();
        world.score = 499;
        assert!(!world.spend_revive());
        world.score = 700;
        assert!(world.spend_revive());
        assert_eq!(world.score, 200);
    }
}
