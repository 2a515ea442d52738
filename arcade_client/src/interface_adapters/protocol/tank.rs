// Tank battle wire messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ProtocolError, WireCodec, decode_tagged, encode_json};
use crate::domain::geometry::Rect;
use crate::domain::tank::TankClass;
use crate::use_cases::tank_session::{
    BulletView, FlagView, LeaderboardEntry, PowerUpView, RoomSummary, TankInbound, TankOutbound,
    TankSnapshot, TankView, TeamInfo,
};

const SERVER_TYPES: &[&str] = &[
    "game_state",
    "tank_assigned",
    "tank_destroyed",
    "tank_respawned",
    "room_list",
    "powerup_collected",
    "error",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TankServerMessage {
    GameState {
        state: RoomStateDto,
        #[serde(default)]
        leaderboard: Option<Vec<LeaderboardDto>>,
        #[serde(default, rename = "teamInfo")]
        team_info: Option<TeamInfoDto>,
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
        #[serde(default)]
        rooms: Vec<RoomDto>,
    },
    #[serde(rename = "powerup_collected")]
    PowerUpCollected {
        tank_id: String,
        powerup_type: String,
        #[serde(default)]
        value: i32,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TankClientMessage {
    Join {
        name: String,
        #[serde(rename = "tankClass")]
        tank_class: &'static str,
        #[serde(rename = "gameMode")]
        game_mode: &'static str,
        #[serde(rename = "roomCode")]
        room_code: Option<String>,
    },
    Input {
        input: InputDto,
    },
    GetRooms {
        #[serde(rename = "gameMode")]
        game_mode: &'static str,
    },
    LeaveGame,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputDto {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomStateDto {
    #[serde(default)]
    pub tanks: BTreeMap<String, TankDto>,
    #[serde(default)]
    pub bullets: Vec<BulletDto>,
    #[serde(default)]
    pub obstacles: Vec<ObstacleDto>,
    #[serde(default)]
    pub powerups: Vec<PowerUpDto>,
    #[serde(default)]
    pub flags: Vec<FlagDto>,
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    pub health: i32,
    #[serde(default)]
    pub max_health: i32,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub tank_class: Option<String>,
}

fn default_alive() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulletDto {
    #[serde(default)]
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub owner_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleDto {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PowerUpDto {
    #[serde(default)]
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlagDto {
    #[serde(default)]
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub team: String,
    #[serde(default)]
    pub captured: bool,
    #[serde(default)]
    pub carrier_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardDto {
    pub name: String,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamInfoDto {
    pub mode: String,
    #[serde(default)]
    pub team_scores: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub players: u32,
    #[serde(default)]
    pub max_players: u32,
    #[serde(default)]
    pub mode: String,
}

impl From<TankDto> for TankView {
    fn from(dto: TankDto) -> Self {
        Self {
            class: dto.tank_class.as_deref().and_then(TankClass::parse),
            id: dto.id,
            name: dto.name,
            x: dto.x,
            y: dto.y,
            angle: dto.angle,
            health: dto.health,
            max_health: dto.max_health,
            kills: dto.kills,
            deaths: dto.deaths,
            alive: dto.alive,
            team: dto.team,
        }
    }
}

impl From<RoomStateDto> for TankSnapshot {
    fn from(dto: RoomStateDto) -> Self {
        Self {
            tanks: dto
                .tanks
                .into_iter()
                .map(|(id, tank)| (id, TankView::from(tank)))
                .collect(),
            bullets: dto
                .bullets
                .into_iter()
                .map(|b| BulletView {
                    id: b.id,
                    x: b.x,
                    y: b.y,
                    owner_id: b.owner_id,
                })
                .collect(),
            obstacles: dto
                .obstacles
                .into_iter()
                .map(|o| Rect::new(o.x, o.y, o.width, o.height))
                .collect(),
            powerups: dto
                .powerups
                .into_iter()
                .map(|p| PowerUpView {
                    id: p.id,
                    x: p.x,
                    y: p.y,
                    kind: p.kind,
                    value: p.value,
                })
                .collect(),
            flags: dto
                .flags
                .into_iter()
                .map(|f| FlagView {
                    id: f.id,
                    x: f.x,
                    y: f.y,
                    team: f.team,
                    captured: f.captured,
                    carrier_id: f.carrier_id,
                })
                .collect(),
            teams: dto.teams,
        }
    }
}

impl From<TankServerMessage> for TankInbound {
    fn from(message: TankServerMessage) -> Self {
        match message {
            TankServerMessage::GameState {
                state,
                leaderboard,
                team_info,
            } => TankInbound::GameState {
                state: state.into(),
                leaderboard: leaderboard.map(|rows| {
                    rows.into_iter()
                        .map(|row| LeaderboardEntry {
                            name: row.name,
                            kills: row.kills,
                            deaths: row.deaths,
                            team: row.team,
                        })
                        .collect()
                }),
                team_info: team_info.map(|info| TeamInfo {
                    mode: info.mode,
                    team_scores: info.team_scores,
                }),
            },
            TankServerMessage::TankAssigned { tank_id, room_id } => {
                TankInbound::TankAssigned { tank_id, room_id }
            }
            TankServerMessage::TankDestroyed { tank_id } => TankInbound::TankDestroyed { tank_id },
            TankServerMessage::TankRespawned { tank_id } => TankInbound::TankRespawned { tank_id },
            TankServerMessage::RoomList { rooms } => TankInbound::RoomList {
                rooms: rooms
                    .into_iter()
                    .map(|room| RoomSummary {
                        id: room.id,
                        name: room.name,
                        players: room.players,
                        max_players: room.max_players,
                        mode: room.mode,
                    })
                    .collect(),
            },
            TankServerMessage::PowerUpCollected {
                tank_id,
                powerup_type,
                value,
            } => TankInbound::PowerUpCollected {
                tank_id,
                kind: powerup_type,
                value,
            },
            TankServerMessage::Error { message } => TankInbound::Error { message },
        }
    }
}

impl From<&TankOutbound> for TankClientMessage {
    fn from(message: &TankOutbound) -> Self {
        match message {
            TankOutbound::Join {
                name,
                class,
                mode,
                room_code,
            } => TankClientMessage::Join {
                name: name.clone(),
                tank_class: class.as_str(),
                game_mode: mode.as_str(),
                room_code: room_code.clone(),
            },
            TankOutbound::Input {
                up,
                down,
                left,
                right,
                fire,
            } => TankClientMessage::Input {
                input: InputDto {
                    up: *up,
                    down: *down,
                    left: *left,
                    right: *right,
                    fire: *fire,
                },
            },
            TankOutbound::GetRooms { mode } => TankClientMessage::GetRooms {
                game_mode: mode.as_str(),
            },
            TankOutbound::LeaveGame => TankClientMessage::LeaveGame,
        }
    }
}

pub struct TankCodec;

impl WireCodec for TankCodec {
    type Inbound = TankInbound;
    type Outbound = TankOutbound;

    fn decode(text: &str) -> Result<TankInbound, ProtocolError> {
        decode_tagged::<TankServerMessage>(text, SERVER_TYPES).map(TankInbound::from)
    }

    fn encode(message: &TankOutbound) -> Result<String, ProtocolError> {
        encode_json(&TankClientMessage::from(message))
    }
}
