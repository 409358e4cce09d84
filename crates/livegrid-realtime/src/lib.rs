//! Realtime client for the LiveGrid dashboard.
//!
//! Three cooperating pieces: the connection manager (`client`) owns one
//! WebSocket at a time with bounded fixed-interval reconnect and
//! best-effort sends; the hub (`hub`) wraps a single client instance,
//! derives a UI-facing connection status, and translates record events
//! into toasts; room subscriptions (`room`) scope a bounded event log
//! and a presence set to one table.

pub mod client;
pub mod hub;
pub mod room;

pub use client::{
    frame_types, ClientEvent, ConnectionState, ConnectionStatus, EventKind, Frame,
    RealtimeClient, RealtimeConfig, RecordChange,
};
pub use hub::{HubHandle, RealtimeHub};
pub use room::{EventLog, PresenceSet, RoomSubscription};
