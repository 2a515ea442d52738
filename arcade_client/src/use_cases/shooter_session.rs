// Space shooter session. Single player runs the whole world locally; in multiplayer the
// server snapshot overwrites the pools and the local world only animates.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use super::client_loop::{GameSession, SessionAction};
use super::types::Authority;
use crate::domain::input::InputState;
use crate::domain::shooter::{RemotePlayer, Screen, ShooterEvent, ShooterWorld};
use crate::domain::shooter::projectile::{PLAYER_BULLET_HEIGHT, PLAYER_BULLET_WIDTH};
use crate::domain::shooter::player::PLAYER_SIZE;
use crate::domain::tuning::shooter::ShooterTuning;

pub const DEFAULT_ROOM: &str = "room1";
const DEFAULT_MAX_HEALTH: i32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterPlayerView {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub health: i32,
    pub max_health: Option<i32>,
    pub alive: bool,
    pub score: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterEnemyView {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub alive: bool,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterBulletView {
    pub x: f32,
    pub y: f32,
    pub alive: bool,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShooterSnapshot {
    pub players: Vec<ShooterPlayerView>,
    pub enemies: Vec<ShooterEnemyView>,
    pub bullets: Vec<ShooterBulletView>,
    pub score: Option<u64>,
    pub room_id: Option<String>,
}

impl ShooterSnapshot {
    /// Full overwrite of the server-owned parts of the world. Entries beyond a pool's
    /// capacity are ignored.
    pub fn apply(&self, world: &mut ShooterWorld, own_id: Option<&str>) {
        world.enemies.kill_all();
        world.bullets.kill_all();
        world.remote_players.clear();

        for player in &self.players {
            if own_id == Some(player.id.as_str()) {
                let body = &mut world.player.body;
                body.x = player.x;
                body.y = player.y;
                body.health = player.health;
                body.alive = player.alive;
                if let Some(score) = player.score {
                    world.score = score;
                }
            } else {
                world.remote_players.push(RemotePlayer {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    x: player.x,
                    y: player.y,
                    width: player.width.unwrap_or(PLAYER_SIZE),
                    height: player.height.unwrap_or(PLAYER_SIZE),
                    health: player.health,
                    max_health: player.max_health.unwrap_or(DEFAULT_MAX_HEALTH),
                    alive: player.alive,
                    score: player.score.unwrap_or(0),
                });
            }
        }

        for (index, view) in self.enemies.iter().enumerate() {
            let Some(enemy) = world.enemies.get_mut(index) else {
                break;
            };
            enemy.body.x = view.x;
            enemy.body.y = view.y;
            enemy.body.health = view.health;
            enemy.body.alive = view.alive;
            enemy.body.width = view.width;
            enemy.body.height = view.height;
        }

        for (index, view) in self.bullets.iter().enumerate() {
            let Some(bullet) = world.bullets.get_mut(index) else {
                break;
            };
            bullet.x = view.x;
            bullet.y = view.y;
            bullet.alive = view.alive;
            bullet.width = view.width.unwrap_or(PLAYER_BULLET_WIDTH);
            bullet.height = view.height.unwrap_or(PLAYER_BULLET_HEIGHT);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShooterInbound {
    JoinedGame {
        success: bool,
        player_id: Option<String>,
        player_name: Option<String>,
        room_id: Option<String>,
    },
    GameState(ShooterSnapshot),
    ReviveResponse {
        success: bool,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShooterOutbound {
    JoinGame {
        player_name: String,
        room_id: String,
    },
    PlayerInput {
        left: bool,
        right: bool,
        up: bool,
        down: bool,
        shoot: bool,
    },
    PlayerShoot,
    ReviveTeammate,
}

pub struct ShooterSession {
    world: ShooterWorld,
    player_name: String,
    room_id: String,
    player_id: Option<String>,
    joining: bool,
    rng: StdRng,
}

impl ShooterSession {
    pub fn new(player_name: String, room_id: Option<String>, tuning: ShooterTuning) -> Self {
        Self::with_rng(player_name, room_id, tuning, StdRng::from_entropy())
    }

    pub fn with_rng(
        player_name: String,
        room_id: Option<String>,
        tuning: ShooterTuning,
        mut rng: StdRng,
    ) -> Self {
        Self {
            world: ShooterWorld::new(tuning, &mut rng),
            player_name,
            room_id: room_id.unwrap_or_else(|| DEFAULT_ROOM.to_string()),
            player_id: None,
            joining: false,
            rng,
        }
    }

    pub fn world(&self) -> &ShooterWorld {
        &self.world
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    fn online(&self) -> bool {
        self.world.multiplayer && self.player_id.is_some()
    }

    fn report(&self, events: &[ShooterEvent]) {
        for event in events {
            match event {
                ShooterEvent::BossSpawned => info!("boss spawned"),
                ShooterEvent::BossPhase(phase) => info!(phase = phase.number(), "boss phase"),
                ShooterEvent::BossDestroyed => info!(score = self.world.score, "boss destroyed"),
                ShooterEvent::LifeLost { lives_left } => debug!(lives_left, "life lost"),
                ShooterEvent::GameOver { score } => info!(score, "game over"),
                _ => {}
            }
        }
    }

    fn tick_online(&mut self, input: &InputState) -> Vec<SessionAction<ShooterOutbound>> {
        let mut actions = vec![SessionAction::Send(ShooterOutbound::PlayerInput {
            left: input.left,
            right: input.right,
            up: input.up,
            down: input.down,
            shoot: input.fire,
        })];
        let cooldown = self.world.tuning.fire_cooldown;
        if self.world.player.body.alive && self.world.player.trigger(input.fire, cooldown) {
            actions.push(SessionAction::Send(ShooterOutbound::PlayerShoot));
        }
        if input.revive {
            if self.world.spend_revive() {
                info!(score = self.world.score, "revive requested");
                actions.push(SessionAction::Send(ShooterOutbound::ReviveTeammate));
            } else {
                actions.push(SessionAction::Notice(format!(
                    "need {} points to revive",
                    self.world.tuning.revive_cost
                )));
            }
        }
        actions
    }
}

impl GameSession for ShooterSession {
    type Inbound = ShooterInbound;
    type Outbound = ShooterOutbound;

    fn name(&self) -> &'static str {
        "shooter"
    }

    fn connect_on_start(&self) -> bool {
        false
    }

    fn can_reconnect(&self) -> bool {
        self.player_id.is_some()
    }

    fn on_open(&mut self) -> Vec<ShooterOutbound> {
        vec![ShooterOutbound::JoinGame {
            player_name: self.player_name.clone(),
            room_id: self.room_id.clone(),
        }]
    }

    fn on_message(&mut self, message: ShooterInbound) -> Vec<SessionAction<ShooterOutbound>> {
        match message {
            ShooterInbound::JoinedGame {
                success: true,
                player_id,
                player_name,
                room_id,
            } => {
                let rejoin = self.world.multiplayer && self.world.screen == Screen::Playing;
                self.joining = false;
                self.player_id = player_id;
                if let Some(room) = room_id {
                    self.room_id = room;
                }
                info!(
                    player_id = self.player_id.as_deref().unwrap_or("-"),
                    player_name = player_name.as_deref().unwrap_or(&self.player_name),
                    room_id = %self.room_id,
                    "joined shooter room"
                );
                if !rejoin {
                    self.world.enter_multiplayer();
                }
                Vec::new()
            }
            ShooterInbound::JoinedGame { success: false, .. } => {
                warn!("join rejected");
                self.joining = false;
                vec![
                    SessionAction::Notice("join rejected".to_string()),
                    SessionAction::Disconnect,
                ]
            }
            ShooterInbound::GameState(snapshot) => {
                if self.world.multiplayer && self.world.screen == Screen::Playing {
                    snapshot.apply(&mut self.world, self.player_id.as_deref());
                } else {
                    debug!("snapshot outside a multiplayer round, ignoring");
                }
                Vec::new()
            }
            ShooterInbound::ReviveResponse { success, message } => {
                let text = if success {
                    "teammate revived".to_string()
                } else {
                    format!(
                        "revive failed: {}",
                        message.as_deref().unwrap_or("unknown reason")
                    )
                };
                vec![SessionAction::Notice(text)]
            }
        }
    }

    fn on_connection_lost(&mut self, establishing: bool) -> Vec<SessionAction<ShooterOutbound>> {
        if establishing {
            vec![
                SessionAction::Notice("could not connect - starting single player".to_string()),
                SessionAction::GoLocal,
            ]
        } else {
            vec![SessionAction::Notice("disconnected".to_string())]
        }
    }

    fn enter_local(&mut self) {
        self.world.multiplayer = false;
        self.player_id = None;
        if self.joining {
            self.joining = false;
            self.world.start();
        }
    }

    fn tick(
        &mut self,
        input: &InputState,
        authority: Authority,
    ) -> Vec<SessionAction<ShooterOutbound>> {
        if input.escape {
            if self.world.screen == Screen::Title {
                return vec![SessionAction::Quit];
            }
            let was_multiplayer = self.world.multiplayer;
            self.world.back_to_title();
            self.player_id = None;
            self.joining = false;
            return if was_multiplayer {
                vec![SessionAction::Disconnect]
            } else {
                Vec::new()
            };
        }

        let mut actions = Vec::new();
        if self.world.screen == Screen::Title && input.multiplayer && !self.joining {
            if authority == Authority::Remote {
                // Socket is already open, join straight away.
                actions.push(SessionAction::Send(ShooterOutbound::JoinGame {
                    player_name: self.player_name.clone(),
                    room_id: self.room_id.clone(),
                }));
            } else {
                actions.push(SessionAction::Connect);
            }
            self.joining = true;
            return actions;
        }

        if authority == Authority::Remote && self.online() && self.world.screen == Screen::Playing
        {
            actions.extend(self.tick_online(input));
        }

        // Under remote authority the world only animates; under local authority it simulates.
        let events = self.world.step(input, &mut self.rng);
        self.report(&events);
        actions
    }

    fn hud(&self) -> String {
        let world = &self.world;
        match world.screen {
            Screen::Title => {
                "SPACE SHOOTER | Enter: single player | m: multiplayer | Esc: quit".to_string()
            }
            Screen::GameOver => format!("GAME OVER | score {} | Enter to restart", world.score),
            Screen::Playing => {
                let mut hud = format!(
                    "score {} | lives {} | kills {} | power {}",
                    world.score, world.lives, world.kills, world.player.power_level
                );
                if let Some(boss) = &world.boss {
                    hud.push_str(&format!(
                        " | boss {}/{} phase {}",
                        boss.body.health.max(0),
                        boss.body.max_health,
                        boss.phase.number()
                    ));
                }
                if world.multiplayer {
                    hud.push_str(&format!(
                        " | room {} | {} teammates",
                        self.room_id,
                        world.remote_players.len()
                    ));
                    let dead = world.dead_teammates();
                    if dead > 0 {
                        hud.push_str(&format!(" | {dead} down, r to revive"));
                    }
                }
                hud
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ShooterSession {
        ShooterSession::with_rng(
            "Ada".to_string(),
            None,
            ShooterTuning::default(),
            StdRng::seed_from_u64(11),
        )
    }

    fn joined() -> ShooterSession {
        let mut session = session();
        session.on_message(ShooterInbound::JoinedGame {
            success: true,
            player_id: Some("me".to_string()),
            player_name: Some("Ada".to_string()),
            room_id: Some("room1".to_string()),
        });
        session
    }

    fn snapshot() -> ShooterSnapshot {
        ShooterSnapshot {
            players: vec![
                ShooterPlayerView {
                    id: "me".to_string(),
                    name: "Ada".to_string(),
                    x: 50.0,
                    y: 60.0,
                    width: None,
                    height: None,
                    health: 70,
                    max_health: Some(100),
                    alive: true,
                    score: Some(900),
                },
                ShooterPlayerView {
                    id: "mate".to_string(),
                    name: "Bob".to_string(),
                    x: 80.0,
                    y: 90.0,
                    width: None,
                    height: None,
                    health: 0,
                    max_health: None,
                    alive: false,
                    score: None,
                },
            ],
            enemies: vec![
                ShooterEnemyView {
                    x: 500.0,
                    y: 100.0,
                    health: 40,
                    alive: true,
                    width: 32.0,
                    height: 32.0,
                },
                ShooterEnemyView {
                    x: 600.0,
                    y: 200.0,
                    health: 80,
                    alive: true,
                    width: 32.0,
                    height: 32.0,
                },
            ],
            bullets: vec![ShooterBulletView {
                x: 70.0,
                y: 64.0,
                alive: true,
                width: None,
                height: None,
            }],
            score: Some(900),
            room_id: Some("room1".to_string()),
        }
    }

    #[test]
    fn when_join_succeeds_then_multiplayer_round_starts() {
        let session = joined();
        assert!(session.world().multiplayer);
        assert_eq!(session.world().screen, Screen::Playing);
        assert_eq!(session.player_id(), Some("me"));
    }

    #[test]
    fn when_snapshot_arrives_then_pools_and_roster_are_overwritten() {
        let mut session = joined();
        session.on_message(ShooterInbound::GameState(snapshot()));

        let world = session.world();
        assert_eq!((world.player.body.x, world.player.body.y), (50.0, 60.0));
        assert_eq!(world.player.body.health, 70);
        assert_eq!(world.score, 900);
        assert_eq!(world.enemies.alive_count(), 2);
        assert_eq!(world.bullets.alive_count(), 1);
        assert_eq!(world.remote_players.len(), 1);
        assert_eq!(world.remote_players[0].width, 32.0);
        assert_eq!(world.dead_teammates(), 1);
    }

    #[test]
    fn when_same_snapshot_is_applied_twice_then_world_is_unchanged() {
        let mut session = joined();
        session.on_message(ShooterInbound::GameState(snapshot()));
        let enemies: Vec<_> = session.world().enemies.iter().map(|e| e.body.clone()).collect();
        let roster = session.world().remote_players.clone();

        session.on_message(ShooterInbound::GameState(snapshot()));

        let again: Vec<_> = session.world().enemies.iter().map(|e| e.body.clone()).collect();
        assert_eq!(enemies, again);
        assert_eq!(roster, session.world().remote_players);
    }

    #[test]
    fn when_snapshot_is_smaller_then_stale_enemies_die() {
        let mut session = joined();
        session.on_message(ShooterInbound::GameState(snapshot()));
        session.on_message(ShooterInbound::GameState(ShooterSnapshot {
            enemies: Vec::new(),
            ..snapshot()
        }));
        assert_eq!(session.world().enemies.alive_count(), 0);
    }

    #[test]
    fn when_snapshot_overflows_pool_then_extra_entries_are_dropped() {
        let mut session = joined();
        let capacity = session.world().enemies.capacity();
        let many = ShooterSnapshot {
            enemies: (0..capacity + 10)
                .map(|i| ShooterEnemyView {
                    x: i as f32,
                    y: 0.0,
                    health: 80,
                    alive: true,
                    width: 32.0,
                    height: 32.0,
                })
                .collect(),
            ..snapshot()
        };
        session.on_message(ShooterInbound::GameState(many));
        assert_eq!(session.world().enemies.alive_count(), capacity);
    }

    #[test]
    fn when_revive_is_requested_online_then_points_are_spent_and_request_sent() {
        let mut session = joined();
        session.on_message(ShooterInbound::GameState(snapshot()));
        let revive = InputState {
            revive: true,
            ..InputState::default()
        };

        let actions = session.tick(&revive, Authority::Remote);

        assert!(actions.contains(&SessionAction::Send(ShooterOutbound::ReviveTeammate)));
        assert_eq!(session.world().score, 400);

        let again = session.tick(&revive, Authority::Remote);
        assert!(!again.contains(&SessionAction::Send(ShooterOutbound::ReviveTeammate)));
        assert_eq!(session.world().score, 400);
    }

    #[test]
    fn when_multiplayer_is_requested_from_title_then_loop_connects() {
        let mut session = session();
        let m = InputState {
            multiplayer: true,
            ..InputState::default()
        };
        assert_eq!(
            session.tick(&m, Authority::Local),
            vec![SessionAction::Connect]
        );
        assert_eq!(
            session.on_open(),
            vec![ShooterOutbound::JoinGame {
                player_name: "Ada".to_string(),
                room_id: "room1".to_string(),
            }]
        );
    }

    #[test]
    fn when_connection_cannot_be_made_then_single_player_starts() {
        let mut session = session();
        let m = InputState {
            multiplayer: true,
            ..InputState::default()
        };
        session.tick(&m, Authority::Local);

        let actions = session.on_connection_lost(true);
        assert!(actions.contains(&SessionAction::GoLocal));
        session.enter_local();

        assert!(!session.world().multiplayer);
        assert_eq!(session.world().screen, Screen::Playing);
    }

    #[test]
    fn when_escape_is_pressed_in_multiplayer_then_title_returns_and_socket_closes() {
        let mut session = joined();
        let escape = InputState {
            escape: true,
            ..InputState::default()
        };
        assert_eq!(
            session.tick(&escape, Authority::Remote),
            vec![SessionAction::Disconnect]
        );
        assert_eq!(session.world().screen, Screen::Title);
        assert!(!session.can_reconnect());
    }

    #[test]
    fn when_playing_online_then_input_is_sent_each_tick_and_shots_on_trigger() {
        let mut session = joined();
        let fire = InputState {
            fire: true,
            ..InputState::default()
        };
        let actions = session.tick(&fire, Authority::Remote);
        assert_eq!(
            actions,
            vec![
                SessionAction::Send(ShooterOutbound::PlayerInput {
                    left: false,
                    right: false,
                    up: false,
                    down: false,
                    shoot: true,
                }),
                SessionAction::Send(ShooterOutbound::PlayerShoot),
            ]
        );
        let next = session.tick(&fire, Authority::Remote);
        assert_eq!(next.len(), 1);
    }
}
