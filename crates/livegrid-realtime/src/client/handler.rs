//! Inbound frame decoding and type-based routing.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, trace};

use super::state::ConnectionState;
use super::types::{ClientEvent, EventKind, Frame};

/// Handle one raw text frame: parse, count, route, publish. Malformed
/// frames are dropped without touching connection state.
pub(crate) async fn handle_text_frame(
    text: &str,
    state: &Arc<RwLock<ConnectionState>>,
    event_tx: &broadcast::Sender<ClientEvent>,
) {
    let frame = match Frame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "Dropping malformed frame");
            return;
        }
    };

    state.write().await.record_received();
    route(&frame);
    // Internal routing above must never prevent external delivery.
    let _ = event_tx.send(ClientEvent::Message(frame));
}

fn route(frame: &Frame) {
    match frame.classify() {
        EventKind::Pong => trace!("Pong received"),
        EventKind::PresenceUpdate { users } => {
            debug!(users = users.len(), "Presence update");
        }
        EventKind::RecordCreated(change) => {
            debug!(record = change.record_id.as_deref().unwrap_or("?"), "Record created");
        }
        EventKind::RecordUpdated(change) => {
            debug!(record = change.record_id.as_deref().unwrap_or("?"), "Record updated");
        }
        EventKind::RecordDeleted(change) => {
            debug!(record = change.record_id.as_deref().unwrap_or("?"), "Record deleted");
        }
        EventKind::UserJoined { user_id } => debug!(user = %user_id, "User joined"),
        EventKind::UserLeft { user_id } => debug!(user = %user_id, "User left"),
        EventKind::Unknown { kind } => debug!(kind = %kind, "Unhandled event type"),
    }
}
