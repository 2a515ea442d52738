// Tank battle session. Online the server owns every tank; offline a practice arena runs
// the local simulation against stationary dummies.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::client_loop::{GameSession, SessionAction};
use super::types::Authority;
use crate::domain::geometry::Rect;
use crate::domain::input::InputState;
use crate::domain::tank::{ArenaEvent, TankArena, TankClass};
use crate::domain::tuning::tank::TankTuning;

const BANNER_SECONDS: f32 = 2.0;
const LEADERBOARD_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Deathmatch,
    Team,
    Capture,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Deathmatch => "deathmatch",
            GameMode::Team => "team",
            GameMode::Capture => "capture",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "deathmatch" => Some(GameMode::Deathmatch),
            "team" => Some(GameMode::Team),
            "capture" => Some(GameMode::Capture),
            _ => None,
        }
    }

    /// Team modes let the player pick a room from the list.
    pub fn has_rooms(self) -> bool {
        matches!(self, GameMode::Team | GameMode::Capture)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TankView {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub health: i32,
    pub max_health: i32,
    pub kills: u32,
    pub deaths: u32,
    pub alive: bool,
    pub team: Option<String>,
    pub class: Option<TankClass>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulletView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerUpView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub kind: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub team: String,
    pub captured: bool,
    pub carrier_id: Option<String>,
}

/// Whole-room state from the server, replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TankSnapshot {
    pub tanks: BTreeMap<String, TankView>,
    pub bullets: Vec<BulletView>,
    pub obstacles: Vec<Rect>,
    pub powerups: Vec<PowerUpView>,
    pub flags: Vec<FlagView>,
    pub teams: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub kills: u32,
    pub deaths: u32,
    pub team: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamInfo {
    pub mode: String,
    pub team_scores: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub players: u32,
    pub max_players: u32,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TankInbound {
    GameState {
        state: TankSnapshot,
        leaderboard: Option<Vec<LeaderboardEntry>>,
        team_info: Option<TeamInfo>,
    },
    TankAssigned {
        tank_id: String,
        room_id: String,
    },
    TankDestroyed {
        tank_id: String,
    },
    TankRespawned {
        tank_id: String,
    },
    RoomList {
        rooms: Vec<RoomSummary>,
    },
    PowerUpCollected {
        tank_id: String,
        kind: String,
        value: i32,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TankOutbound {
    Join {
        name: String,
        class: TankClass,
        mode: GameMode,
        room_code: Option<String>,
    },
    Input {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        fire: bool,
    },
    GetRooms {
        mode: GameMode,
    },
    LeaveGame,
}

#[derive(Debug, Clone)]
pub struct TankOptions {
    pub player_name: String,
    pub class: TankClass,
    pub mode: GameMode,
    pub room_code: Option<String>,
}

pub struct TankSession {
    options: TankOptions,
    tuning: TankTuning,
    tick_seconds: f32,
    tank_id: Option<String>,
    room_id: Option<String>,
    snapshot: Option<TankSnapshot>,
    leaderboard: Vec<LeaderboardEntry>,
    team_info: Option<TeamInfo>,
    rooms: Vec<RoomSummary>,
    respawn_countdown: Option<f32>,
    banner: Option<(String, f32)>,
    practice: Option<TankArena>,
}

impl TankSession {
    pub fn new(options: TankOptions, tuning: TankTuning, tick_seconds: f32) -> Self {
        Self {
            options,
            tuning,
            tick_seconds,
            tank_id: None,
            room_id: None,
            snapshot: None,
            leaderboard: Vec::new(),
            team_info: None,
            rooms: Vec::new(),
            respawn_countdown: None,
            banner: None,
            practice: None,
        }
    }

    pub fn options(&self) -> &TankOptions {
        &self.options
    }

    pub fn tuning(&self) -> &TankTuning {
        &self.tuning
    }

    pub fn tank_id(&self) -> Option<&str> {
        self.tank_id.as_deref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn snapshot(&self) -> Option<&TankSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn leaderboard(&self) -> &[LeaderboardEntry] {
        &self.leaderboard
    }

    pub fn team_info(&self) -> Option<&TeamInfo> {
        self.team_info.as_ref()
    }

    pub fn rooms(&self) -> &[RoomSummary] {
        &self.rooms
    }

    pub fn practice(&self) -> Option<&TankArena> {
        self.practice.as_ref()
    }

    pub fn respawn_countdown(&self) -> Option<f32> {
        self.respawn_countdown
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn own_tank(&self) -> Option<&TankView> {
        let id = self.tank_id.as_ref()?;
        self.snapshot.as_ref()?.tanks.get(id)
    }

    fn show(&mut self, text: String) {
        self.banner = Some((text, BANNER_SECONDS));
    }

    fn age_overlays(&mut self) {
        let dt = self.tick_seconds;
        if let Some((_, remaining)) = &mut self.banner {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.banner = None;
            }
        }
        if let Some(remaining) = &mut self.respawn_countdown {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.respawn_countdown = None;
            }
        }
    }

    fn tick_practice(&mut self, input: &InputState) {
        let Some(arena) = self.practice.as_mut() else {
            return;
        };
        let events = arena.step(input, self.tick_seconds);
        for event in events {
            match event {
                ArenaEvent::Destroyed { target, by } => {
                    let victim = arena.tanks.get(target).map(|t| t.name.clone());
                    info!(?victim, ?by, "practice tank destroyed");
                    if target == crate::domain::tank::PLAYER {
                        self.respawn_countdown = Some(self.tuning.respawn_seconds);
                    } else if let Some(victim) = victim {
                        self.banner = Some((format!("{victim} destroyed"), BANNER_SECONDS));
                    }
                }
                ArenaEvent::Respawned { tank } if tank == crate::domain::tank::PLAYER => {
                    self.respawn_countdown = None;
                }
                _ => {}
            }
        }
    }
}

impl GameSession for TankSession {
    type Inbound = TankInbound;
    type Outbound = TankOutbound;

    fn name(&self) -> &'static str {
        "tank"
    }

    fn can_reconnect(&self) -> bool {
        !self.options.player_name.is_empty() && self.practice.is_none()
    }

    fn on_open(&mut self) -> Vec<TankOutbound> {
        self.practice = None;
        let mut out = vec![TankOutbound::Join {
            name: self.options.player_name.clone(),
            class: self.options.class,
            mode: self.options.mode,
            room_code: self.options.room_code.clone(),
        }];
        if self.options.mode.has_rooms() {
            out.push(TankOutbound::GetRooms {
                mode: self.options.mode,
            });
        }
        out
    }

    fn on_message(&mut self, message: TankInbound) -> Vec<SessionAction<TankOutbound>> {
        match message {
            TankInbound::GameState {
                state,
                leaderboard,
                team_info,
            } => {
                self.snapshot = Some(state);
                if let Some(mut leaderboard) = leaderboard {
                    leaderboard.truncate(LEADERBOARD_ROWS);
                    self.leaderboard = leaderboard;
                }
                if let Some(team_info) = team_info {
                    self.team_info = Some(team_info);
                }
            }
            TankInbound::TankAssigned { tank_id, room_id } => {
                info!(tank_id = %tank_id, room_id = %room_id, "tank assigned");
                self.tank_id = Some(tank_id);
                self.room_id = Some(room_id);
            }
            TankInbound::TankDestroyed { tank_id } => {
                if self.tank_id.as_deref() == Some(tank_id.as_str()) {
                    self.respawn_countdown = Some(self.tuning.respawn_seconds);
                }
            }
            TankInbound::TankRespawned { tank_id } => {
                if self.tank_id.as_deref() == Some(tank_id.as_str()) {
                    self.respawn_countdown = None;
                }
            }
            TankInbound::RoomList { rooms } => {
                self.rooms = rooms;
            }
            TankInbound::PowerUpCollected {
                tank_id,
                kind,
                value,
            } => {
                if self.tank_id.as_deref() == Some(tank_id.as_str()) {
                    let text = match kind.as_str() {
                        "health" => format!("+{value} HEALTH"),
                        "speed" => "SPEED BOOST!".to_string(),
                        "damage" => "DAMAGE BOOST!".to_string(),
                        other => format!("{} POWER-UP", other.to_ascii_uppercase()),
                    };
                    self.show(text);
                }
            }
            TankInbound::Error { message } => {
                warn!(%message, "tank server error");
                return vec![SessionAction::Notice(format!("ERROR: {message}"))];
            }
        }
        Vec::new()
    }

    fn on_connection_lost(&mut self, establishing: bool) -> Vec<SessionAction<TankOutbound>> {
        if establishing {
            vec![SessionAction::Notice(
                "CONNECTION FAILED - Enter to retry".to_string(),
            )]
        } else {
            vec![SessionAction::Notice("DISCONNECTED".to_string())]
        }
    }

    fn enter_local(&mut self) {
        self.snapshot = None;
        self.tank_id = None;
        self.room_id = None;
        self.practice = Some(TankArena::practice(
            self.tuning,
            &self.options.player_name,
            self.options.class,
        ));
    }

    fn tick(&mut self, input: &InputState, authority: Authority) -> Vec<SessionAction<TankOutbound>> {
        self.age_overlays();
        if input.escape {
            return vec![SessionAction::Quit];
        }

        match authority {
            Authority::Remote => {
                let mut actions = vec![SessionAction::Send(TankOutbound::Input {
                    up: input.up,
                    down: input.down,
                    left: input.left,
                    right: input.right,
                    fire: input.fire,
                })];
                if input.reset && self.options.mode.has_rooms() {
                    actions.push(SessionAction::Send(TankOutbound::GetRooms {
                        mode: self.options.mode,
                    }));
                }
                actions
            }
            Authority::Local if self.practice.is_some() => {
                self.tick_practice(input);
                Vec::new()
            }
            Authority::Local if input.start => vec![SessionAction::Connect],
            Authority::Local => Vec::new(),
        }
    }

    fn farewell(&self) -> Vec<TankOutbound> {
        vec![TankOutbound::LeaveGame]
    }

    fn hud(&self) -> String {
        let mut hud = if let Some(arena) = &self.practice {
            match arena.player() {
                Some(tank) => format!(
                    "PRACTICE | {} | HP {} | K {} D {}",
                    tank.class.as_str().to_ascii_uppercase(),
                    tank.body.health.max(0),
                    tank.kills,
                    tank.deaths
                ),
                None => "PRACTICE".to_string(),
            }
        } else if let Some(tank) = self.own_tank() {
            let class = tank.class.unwrap_or(self.options.class);
            format!(
                "{} | HP {} | K {} D {} | {}",
                class.as_str().to_ascii_uppercase(),
                tank.health.max(0),
                tank.kills,
                tank.deaths,
                self.options.mode.as_str().to_ascii_uppercase()
            )
        } else {
            format!(
                "{} | {}",
                self.options.class.as_str().to_ascii_uppercase(),
                self.options.mode.as_str().to_ascii_uppercase()
            )
        };
        if let Some(room) = &self.room_id {
            hud.push_str(&format!(" | room {room}"));
        }
        if let Some(team) = self.own_tank().and_then(|tank| tank.team.as_ref()) {
            hud.push_str(&format!(" | TEAM {}", team.to_ascii_uppercase()));
        }
        if let Some(seconds) = self.respawn_countdown {
            hud.push_str(&format!(" | RESPAWNING IN {}...", seconds.ceil() as u32));
        }
        if let Some(banner) = self.banner() {
            hud.push_str(" | ");
            hud.push_str(banner);
        }
        hud
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(mode: GameMode) -> TankSession {
        TankSession::new(
            TankOptions {
                player_name: "Ada".to_string(),
                class: TankClass::Heavy,
                mode,
                room_code: None,
            },
            TankTuning::default(),
            1.0 / 60.0,
        )
    }

    fn tank(id: &str, health: i32) -> TankView {
        TankView {
            id: id.to_string(),
            name: id.to_string(),
            x: 100.0,
            y: 120.0,
            angle: 0.0,
            health,
            max_health: 150,
            kills: 2,
            deaths: 1,
            alive: health > 0,
            team: Some("red".to_string()),
            class: Some(TankClass::Heavy),
        }
    }

    fn state_with(tanks: &[TankView]) -> TankSnapshot {
        TankSnapshot {
            tanks: tanks.iter().map(|t| (t.id.clone(), t.clone())).collect(),
            obstacles: vec![Rect::new(10.0, 10.0, 40.0, 40.0)],
            ..TankSnapshot::default()
        }
    }

    #[test]
    fn when_socket_opens_in_team_mode_then_join_and_room_request_are_sent() {
        let mut session = session(GameMode::Team);
        let out = session.on_open();
        assert_eq!(
            out,
            vec![
                TankOutbound::Join {
                    name: "Ada".to_string(),
                    class: TankClass::Heavy,
                    mode: GameMode::Team,
                    room_code: None,
                },
                TankOutbound::GetRooms {
                    mode: GameMode::Team
                },
            ]
        );
    }

    #[test]
    fn when_game_state_arrives_twice_then_state_is_unchanged() {
        let mut session = session(GameMode::Deathmatch);
        session.on_message(TankInbound::TankAssigned {
            tank_id: "t1".to_string(),
            room_id: "ABC123".to_string(),
        });
        let message = TankInbound::GameState {
            state: state_with(&[tank("t1", 90), tank("t2", 40)]),
            leaderboard: None,
            team_info: None,
        };

        session.on_message(message.clone());
        let once = session.snapshot().cloned();
        session.on_message(message);

        assert_eq!(session.snapshot().cloned(), once);
        assert_eq!(session.own_tank().map(|t| t.health), Some(90));
    }

    #[test]
    fn when_new_state_arrives_then_old_tanks_are_replaced() {
        let mut session = session(GameMode::Deathmatch);
        session.on_message(TankInbound::GameState {
            state: state_with(&[tank("t1", 90), tank("t2", 40)]),
            leaderboard: None,
            team_info: None,
        });
        session.on_message(TankInbound::GameState {
            state: state_with(&[tank("t3", 100)]),
            leaderboard: None,
            team_info: None,
        });
        let ids: Vec<&str> = session
            .snapshot()
            .map(|s| s.tanks.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(ids, vec!["t3"]);
    }

    #[test]
    fn when_leaderboard_is_long_then_only_top_rows_are_kept() {
        let mut session = session(GameMode::Deathmatch);
        let entries = (0..10)
            .map(|i| LeaderboardEntry {
                name: format!("p{i}"),
                kills: 10 - i,
                deaths: 0,
                team: None,
            })
            .collect();
        session.on_message(TankInbound::GameState {
            state: TankSnapshot::default(),
            leaderboard: Some(entries),
            team_info: None,
        });
        assert_eq!(session.leaderboard().len(), 8);
        assert_eq!(session.leaderboard()[0].name, "p0");
    }

    #[test]
    fn when_own_tank_is_destroyed_then_respawn_countdown_runs_until_respawn() {
        let mut session = session(GameMode::Deathmatch);
        session.on_message(TankInbound::TankAssigned {
            tank_id: "t1".to_string(),
            room_id: "R".to_string(),
        });

        session.on_message(TankInbound::TankDestroyed {
            tank_id: "t2".to_string(),
        });
        assert_eq!(session.respawn_countdown(), None);

        session.on_message(TankInbound::TankDestroyed {
            tank_id: "t1".to_string(),
        });
        assert_eq!(session.respawn_countdown(), Some(3.0));
        assert!(session.hud().contains("RESPAWNING IN 3"));

        session.on_message(TankInbound::TankRespawned {
            tank_id: "t1".to_string(),
        });
        assert_eq!(session.respawn_countdown(), None);
    }

    #[test]
    fn when_connected_then_every_tick_sends_current_input() {
        let mut session = session(GameMode::Deathmatch);
        let input = InputState {
            up: true,
            fire: true,
            ..InputState::default()
        };
        let actions = session.tick(&input, Authority::Remote);
        assert_eq!(
            actions,
            vec![SessionAction::Send(TankOutbound::Input {
                up: true,
                down: false,
                left: false,
                right: false,
                fire: true,
            })]
        );
    }

    #[test]
    fn when_health_power_up_is_collected_then_banner_shows_value() {
        let mut session = session(GameMode::Deathmatch);
        session.on_message(TankInbound::TankAssigned {
            tank_id: "t1".to_string(),
            room_id: "R".to_string(),
        });
        session.on_message(TankInbound::PowerUpCollected {
            tank_id: "t1".to_string(),
            kind: "health".to_string(),
            value: 50,
        });
        assert_eq!(session.banner(), Some("+50 HEALTH"));
    }

    #[test]
    fn when_practice_starts_then_local_arena_drives_the_player() {
        let mut session = session(GameMode::Deathmatch);
        session.enter_local();
        let start = session.practice().and_then(|a| a.player()).map(|t| t.body.x);

        let forward = InputState {
            up: true,
            ..InputState::default()
        };
        for _ in 0..60 {
            session.tick(&forward, Authority::Local);
        }

        let end = session.practice().and_then(|a| a.player()).map(|t| t.body.x);
        assert!(end > start);
        assert!(session.hud().starts_with("PRACTICE | HEAVY"));
        assert!(!session.can_reconnect());
    }

    #[test]
    fn when_connect_failed_then_enter_asks_for_a_retry() {
        let mut session = session(GameMode::Deathmatch);
        let enter = InputState {
            start: true,
            ..InputState::default()
        };
        assert_eq!(
            session.tick(&enter, Authority::Local),
            vec![SessionAction::Connect]
        );
    }

    #[test]
    fn when_mode_name_is_parsed_then_case_is_ignored() {
        assert_eq!(GameMode::parse("Capture"), Some(GameMode::Capture));
        assert_eq!(GameMode::parse("ctf"), None);
    }
}
