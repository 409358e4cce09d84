//! Connection manager: one WebSocket transport at a time, bounded
//! fixed-interval reconnect, keepalive pings, and best-effort sends.
//!
//! The manager never raises errors across its public API during normal
//! operation; failures surface on the event stream and in logs.

mod connection;
mod handle;
mod handler;
mod state;
mod types;


pub use handle::RealtimeClient;
pub(crate) use types::Command;
pub use state::{ConnectionState, ConnectionStatus};
pub use types::{frame_types, ClientEvent, EventKind, Frame, RealtimeConfig, RecordChange};
