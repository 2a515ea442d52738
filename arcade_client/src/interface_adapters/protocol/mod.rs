// Wire protocol DTOs and codecs. Every frame is a JSON object tagged by a `type` field.
//
// Decoding reads the tag first so an unknown message and a broken known message are told
// apart; both are logged and skipped by the connection task.

pub mod pong;
pub mod shooter;
pub mod tank;

use serde::de::DeserializeOwned;
use std::fmt;

pub use pong::PongCodec;
pub use shooter::ShooterCodec;
pub use tank::TankCodec;

#[derive(Debug)]
pub enum ProtocolError {
    // The frame is not a JSON object with a string `type` field.
    MissingType,
    UnknownType(String),
    Malformed {
        kind: String,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MissingType => write!(f, "message has no type tag"),
            ProtocolError::UnknownType(kind) => write!(f, "unknown message type {kind:?}"),
            ProtocolError::Malformed { kind, source } => {
                write!(f, "malformed {kind:?} message: {source}")
            }
            ProtocolError::Encode(source) => write!(f, "failed to encode message: {source}"),
        }
    }
}

impl std::error::Error for ProtocolError {}

// Port between the connection task and a game's message types.
pub trait WireCodec: Send + Sync + 'static {
    type Inbound: fmt::Debug + Send + 'static;
    type Outbound: fmt::Debug + Send + 'static;

    fn decode(text: &str) -> Result<Self::Inbound, ProtocolError>;
    fn encode(message: &Self::Outbound) -> Result<String, ProtocolError>;
}

/// Reads the `type` tag of a frame.
pub fn message_type(text: &str) -> Result<String, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| ProtocolError::MissingType)?;
    value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .ok_or(ProtocolError::MissingType)
}

/// Decodes a tagged frame into `T` when its tag is one of `known`.
pub fn decode_tagged<T: DeserializeOwned>(text: &str, known: &[&str]) -> Result<T, ProtocolError> {
    let kind = message_type(text)?;
    if !known.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownType(kind));
    }
    serde_json::from_str(text).map_err(|source| ProtocolError::Malformed { kind, source })
}

pub fn encode_json<T: serde::Serialize>(message: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}
