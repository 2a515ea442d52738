// Pong wire messages.

use serde::{Deserialize, Serialize};

use super::{ProtocolError, WireCodec, decode_tagged, encode_json};
use crate::use_cases::pong_session::{PongInbound, PongOutbound, PongSnapshot};

const SERVER_TYPES: &[&str] = &["connected", "game_state", "player_disconnected", "error"];

/// Messages the pong server sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PongServerMessage {
    Connected {
        // Null for spectators.
        #[serde(default)]
        player_number: Option<u8>,
        room_id: String,
        players_in_room: u32,
        #[serde(default)]
        player_name: Option<String>,
        #[serde(default)]
        is_spectator: Option<bool>,
        #[serde(default)]
        game_state: Option<PongStateDto>,
    },
    GameState {
        data: PongStateDto,
    },
    PlayerDisconnected {
        #[serde(default)]
        remaining_player: Option<u8>,
    },
    Error {
        message: String,
    },
}

/// Messages the client sends to the pong server.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PongClientMessage {
    Join { name: String },
    PaddleMove { y: f32 },
    ResetGame,
    Disconnect,
}

/// Game state as the server reports it; any field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongStateDto {
    #[serde(default)]
    pub ball_x: Option<f32>,
    #[serde(default)]
    pub ball_y: Option<f32>,
    #[serde(default)]
    pub ball_speed_x: Option<f32>,
    #[serde(default)]
    pub ball_speed_y: Option<f32>,
    #[serde(default, rename = "player1Y")]
    pub player1_y: Option<f32>,
    #[serde(default, rename = "player2Y")]
    pub player2_y: Option<f32>,
    #[serde(default)]
    pub player1_score: Option<u32>,
    #[serde(default)]
    pub player2_score: Option<u32>,
    #[serde(default)]
    pub game_active: Option<bool>,
    #[serde(default)]
    pub player1_name: Option<String>,
    #[serde(default)]
    pub player2_name: Option<String>,
}

impl From<PongStateDto> for PongSnapshot {
    fn from(dto: PongStateDto) -> Self {
        Self {
            ball_x: dto.ball_x,
            ball_y: dto.ball_y,
            ball_speed_x: dto.ball_speed_x,
            ball_speed_y: dto.ball_speed_y,
            player1_y: dto.player1_y,
            player2_y: dto.player2_y,
            player1_score: dto.player1_score,
            player2_score: dto.player2_score,
            game_active: dto.game_active,
            player1_name: dto.player1_name,
            player2_name: dto.player2_name,
        }
    }
}

impl From<PongServerMessage> for PongInbound {
    fn from(message: PongServerMessage) -> Self {
        match message {
            PongServerMessage::Connected {
                player_number,
                room_id,
                players_in_room,
                player_name,
                is_spectator,
                game_state,
            } => PongInbound::Connected {
                player_number: player_number.unwrap_or(0),
                room_id,
                players_in_room,
                player_name,
                spectator: is_spectator.unwrap_or(player_number.is_none()),
                snapshot: game_state.map(PongSnapshot::from),
            },
            PongServerMessage::GameState { data } => PongInbound::GameState(data.into()),
            PongServerMessage::PlayerDisconnected { remaining_player } => {
                PongInbound::PlayerDisconnected { remaining_player }
            }
            PongServerMessage::Error { message } => PongInbound::Error { message },
        }
    }
}

impl From<&PongOutbound> for PongClientMessage {
    fn from(message: &PongOutbound) -> Self {
        match message {
            PongOutbound::Join { name } => PongClientMessage::Join { name: name.clone() },
            PongOutbound::PaddleMove { y } => PongClientMessage::PaddleMove { y: *y },
            PongOutbound::ResetGame => PongClientMessage::ResetGame,
            PongOutbound::Disconnect => PongClientMessage::Disconnect,
        }
    }
}

pub struct PongCodec;

impl WireCodec for PongCodec {
    type Inbound = PongInbound;
    type Outbound = PongOutbound;

    fn decode(text: &str) -> Result<PongInbound, ProtocolError> {
        decode_tagged::<PongServerMessage>(text, SERVER_TYPES).map(PongInbound::from)
    }

    fn encode(message: &PongOutbound) -> Result<String, ProtocolError> {
        encode_json(&PongClientMessage::from(message))
    }
}
