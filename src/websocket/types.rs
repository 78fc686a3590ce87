use chrono::{
    DateTime,
    SecondsFormat,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use uuid::Uuid;

pub type ConnectionId = Uuid;

pub const WELCOME_MESSAGE: &str = "Welcome to F1 Dashboard";

/// Timestamps on the wire are ISO-8601 with millisecond precision.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Connected { message: String, timestamp: String },
    Pong { timestamp: String },
}

impl ServerMessage {
    pub fn welcome(at: DateTime<Utc>) -> Self {
        ServerMessage::Connected { message: WELCOME_MESSAGE.to_string(), timestamp: iso_timestamp(at) }
    }

    pub fn pong(at: DateTime<Utc>) -> Self {
        ServerMessage::Pong { timestamp: iso_timestamp(at) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Ping,
}
