//! Configuration, wire frames, and event/command types for the realtime client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use livegrid_common::ProtocolError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for connecting to a realtime endpoint.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Base endpoint URL (e.g. "wss://dash.example.com/realtime").
    pub endpoint: String,
    /// Identity the connection is keyed by. The client is inert until
    /// a non-empty identity is supplied.
    pub user_id: Option<String>,
    /// Fixed delay between reconnect attempts in milliseconds.
    pub reconnect_interval_ms: u64,
    /// Consecutive reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Keepalive ping interval in seconds.
    pub ping_interval_secs: u64,
    /// Timeout for a single connect attempt in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            user_id: None,
            reconnect_interval_ms: 3000,
            max_reconnect_attempts: 10,
            ping_interval_secs: 30,
            connect_timeout_secs: 15,
        }
    }
}

impl RealtimeConfig {
    pub(crate) fn has_identity(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Build the WebSocket URL carrying the caller identity.
    pub(crate) fn ws_url(&self) -> String {
        format!(
            "{}?userId={}",
            self.endpoint,
            self.user_id.as_deref().unwrap_or("")
        )
    }
}

// ---------------------------------------------------------------------------
// Wire Frames
// ---------------------------------------------------------------------------

/// Reserved frame type names on the wire.
pub mod frame_types {
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
    pub const JOIN_TABLE: &str = "join_table";
    pub const LEAVE_TABLE: &str = "leave_table";
    pub const PRESENCE_UPDATE: &str = "presence_update";
    pub const RECORD_CREATED: &str = "record:created";
    pub const RECORD_UPDATED: &str = "record:updated";
    pub const RECORD_DELETED: &str = "record:deleted";
    pub const USER_JOINED: &str = "user:joined";
    pub const USER_LEFT: &str = "user:left";
}

/// One wire-level message. Client- and server-originated frames share
/// this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub timestamp: i64,
}

impl Frame {
    pub fn new(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
            timestamp: now_ms(),
        }
    }

    /// Decode a raw text frame. Malformed frames are dropped by the
    /// caller, never propagated to consumers.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::MalformedFrame(e.to_string()))
    }

    /// Classify into the recognized event vocabulary. Types the client
    /// does not know about come back as `Unknown` so new server-side
    /// event types never fail to parse.
    pub fn classify(&self) -> EventKind {
        let payload = self.payload.as_ref();
        match self.kind.as_str() {
            frame_types::PONG => EventKind::Pong,
            frame_types::PRESENCE_UPDATE => {
                let users = payload
                    .and_then(|p| p.get("users"))
                    .and_then(|u| u.as_array())
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                EventKind::PresenceUpdate { users }
            }
            frame_types::RECORD_CREATED => {
                EventKind::RecordCreated(RecordChange::from_payload(payload))
            }
            frame_types::RECORD_UPDATED => {
                EventKind::RecordUpdated(RecordChange::from_payload(payload))
            }
            frame_types::RECORD_DELETED => {
                EventKind::RecordDeleted(RecordChange::from_payload(payload))
            }
            frame_types::USER_JOINED => match payload_str(payload, "userId") {
                Some(user_id) => EventKind::UserJoined { user_id },
                None => self.unknown(),
            },
            frame_types::USER_LEFT => match payload_str(payload, "userId") {
                Some(user_id) => EventKind::UserLeft { user_id },
                None => self.unknown(),
            },
            _ => self.unknown(),
        }
    }

    fn unknown(&self) -> EventKind {
        EventKind::Unknown {
            kind: self.kind.clone(),
        }
    }
}

fn payload_str(payload: Option<&Value>, key: &str) -> Option<String> {
    payload
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

pub(crate) fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

// ---------------------------------------------------------------------------
// Events & Commands
// ---------------------------------------------------------------------------

/// A record change carried by a `record:*` event.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChange {
    pub record_id: Option<String>,
    /// Whether the change should surface as a user-visible notification.
    /// Defaults to true when the payload does not say otherwise.
    pub notify: bool,
}

impl RecordChange {
    fn from_payload(payload: Option<&Value>) -> Self {
        Self {
            record_id: payload_str(payload, "recordId"),
            notify: payload
                .and_then(|p| p.get("notify"))
                .and_then(|n| n.as_bool())
                .unwrap_or(true),
        }
    }
}

/// Recognized inbound event types plus an unknown passthrough.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Pong,
    PresenceUpdate { users: Vec<String> },
    RecordCreated(RecordChange),
    RecordUpdated(RecordChange),
    RecordDeleted(RecordChange),
    UserJoined { user_id: String },
    UserLeft { user_id: String },
    Unknown { kind: String },
}

/// Events published by the realtime client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Transport established.
    Connected,
    /// Transport lost, intentionally or not.
    Disconnected,
    /// Advisory transport or connect error.
    Error(String),
    /// A decoded inbound frame.
    Message(Frame),
}

/// Commands sent to the background connection task.
#[derive(Debug)]
pub(crate) enum Command {
    Connect,
    Disconnect,
    Reconnect,
    Send {
        kind: String,
        payload: Option<Value>,
    },
    JoinTable {
        table_id: String,
    },
    LeaveTable,
}
