// Space shooter wire messages. Event names double as `type` tags.

use serde::{Deserialize, Serialize};

use super::{ProtocolError, WireCodec, decode_tagged, encode_json};
use crate::use_cases::shooter_session::{
    ShooterBulletView, ShooterEnemyView, ShooterInbound, ShooterOutbound, ShooterPlayerView,
    ShooterSnapshot,
};

const SERVER_TYPES: &[&str] = &["joinedGame", "gameState", "reviveResponse"];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShooterServerMessage {
    #[serde(rename_all = "camelCase")]
    JoinedGame {
        success: bool,
        #[serde(default)]
        player_id: Option<String>,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        room_id: Option<String>,
    },
    GameState {
        #[serde(default)]
        players: Vec<PlayerDto>,
        #[serde(default)]
        enemies: Vec<EnemyDto>,
        #[serde(default)]
        bullets: Vec<BulletDto>,
        #[serde(default)]
        score: Option<u64>,
        #[serde(default)]
        room_id: Option<String>,
    },
    ReviveResponse {
        success: bool,
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShooterClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinGame { player_name: String, room_id: String },
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

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub max_health: Option<i32>,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub score: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnemyDto {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub alive: bool,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulletDto {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub alive: bool,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

impl From<PlayerDto> for ShooterPlayerView {
    fn from(dto: PlayerDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            x: dto.x,
            y: dto.y,
            width: dto.width,
            height: dto.height,
            health: dto.health,
            max_health: dto.max_health,
            alive: dto.alive,
            score: dto.score,
        }
    }
}

impl From<EnemyDto> for ShooterEnemyView {
    fn from(dto: EnemyDto) -> Self {
        Self {
            x: dto.x,
            y: dto.y,
            health: dto.health,
            alive: dto.alive,
            width: dto.width,
            height: dto.height,
        }
    }
}

impl From<BulletDto> for ShooterBulletView {
    fn from(dto: BulletDto) -> Self {
        Self {
            x: dto.x,
            y: dto.y,
            alive: dto.alive,
            width: dto.width,
            height: dto.height,
        }
    }
}

impl From<ShooterServerMessage> for ShooterInbound {
    fn from(message: ShooterServerMessage) -> Self {
        match message {
            ShooterServerMessage::JoinedGame {
                success,
                player_id,
                player_name,
                room_id,
            } => ShooterInbound::JoinedGame {
                success,
                player_id,
                player_name,
                room_id,
            },
            ShooterServerMessage::GameState {
                players,
                enemies,
                bullets,
                score,
                room_id,
            } => ShooterInbound::GameState(ShooterSnapshot {
                players: players.into_iter().map(Into::into).collect(),
                enemies: enemies.into_iter().map(Into::into).collect(),
                bullets: bullets.into_iter().map(Into::into).collect(),
                score,
                room_id,
            }),
            ShooterServerMessage::ReviveResponse { success, message } => {
                ShooterInbound::ReviveResponse { success, message }
            }
        }
    }
}

impl From<&ShooterOutbound> for ShooterClientMessage {
    fn from(message: &ShooterOutbound) -> Self {
        match message {
            ShooterOutbound::JoinGame {
                player_name,
                room_id,
            } => ShooterClientMessage::JoinGame {
                player_name: player_name.clone(),
                room_id: room_id.clone(),
            },
            ShooterOutbound::PlayerInput {
                left,
                right,
                up,
                down,
                shoot,
            } => ShooterClientMessage::PlayerInput {
                left: *left,
                right: *right,
                up: *up,
                down: *down,
                shoot: *shoot,
            },
            ShooterOutbound::PlayerShoot => ShooterClientMessage::PlayerShoot,
            ShooterOutbound::ReviveTeammate => ShooterClientMessage::ReviveTeammate,
        }
    }
}

pub struct ShooterCodec;

impl WireCodec for ShooterCodec {
    type Inbound = ShooterInbound;
    type Outbound = ShooterOutbound;

    fn decode(text: &str) -> Result<ShooterInbound, ProtocolError> {
        decode_tagged::<ShooterServerMessage>(text, SERVER_TYPES).map(ShooterInbound::from)
    }

    fn encode(message: &ShooterOutbound) -> Result<String, ProtocolError> {
        encode_json(&ShooterClientMessage::from(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_game_state_arrives_then_optional_sizes_stay_unset() {
        let text = r#"{"type":"gameState",
            "players":[{"id":"sid1","name":"Ada","x":10,"y":20,"health":100,"alive":true,"score":40}],
            "enemies":[{"id":"e1","x":700,"y":30,"width":32,"height":32,"health":80,"max_health":80,"alive":true}],
            "bullets":[{"id":"b1","x":40,"y":28,"player_id":"sid1","alive":true}],
            "score":40,"room_id":"room1"}"#;

        let ShooterInbound::GameState(snapshot) = ShooterCodec::decode(text).expect("valid state")
        else {
            panic!("expected game state");
        };

        assert_eq!(snapshot.players[0].width, None);
        assert_eq!(snapshot.players[0].score, Some(40));
        assert_eq!(snapshot.enemies[0].width, 32.0);
        assert_eq!(snapshot.bullets[0].width, None);
        assert_eq!(snapshot.room_id.as_deref(), Some("room1"));
    }

    #[test]
    fn when_join_is_encoded_then_event_name_and_camel_case_fields_are_used() {
        let text = ShooterCodec::encode(&ShooterOutbound::JoinGame {
            player_name: "Ada".to_string(),
            room_id: "room1".to_string(),
        })
        .expect("encode");
        assert_eq!(
            text,
            r#"{"type":"joinGame","playerName":"Ada","roomId":"room1"}"#
        );
        assert_eq!(
            ShooterCodec::encode(&ShooterOutbound::ReviveTeammate).expect("encode"),
            r#"{"type":"reviveTeammate"}"#
        );
    }

    #[test]
    fn when_joined_game_arrives_then_player_id_is_read() {
        let inbound = ShooterCodec::decode(
            r#"{"type":"joinedGame","success":true,"playerId":"sid1","playerName":"Ada","roomId":"room1"}"#,
        )
        .expect("valid join reply");
        assert_eq!(
            inbound,
            ShooterInbound::JoinedGame {
                success: true,
                player_id: Some("sid1".to_string()),
                player_name: Some("Ada".to_string()),
                room_id: Some("room1".to_string()),
            }
        );
    }
}
