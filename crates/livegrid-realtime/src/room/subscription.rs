//! Binds the generic event stream to interest in one table.

use tracing::debug;

use crate::client::{ClientEvent, EventKind, RealtimeClient};

use super::event_log::EventLog;
use super::presence::PresenceSet;

/// Interest in one table at a time. Purely derives its log and presence
/// from inbound events; its only outbound responsibility is join/leave.
pub struct RoomSubscription {
    client: RealtimeClient,
    table_id: Option<String>,
    log: EventLog,
    presence: PresenceSet,
}

impl RoomSubscription {
    pub fn new(client: RealtimeClient) -> Self {
        Self {
            client,
            table_id: None,
            log: EventLog::default(),
            presence: PresenceSet::default(),
        }
    }

    pub fn table_id(&self) -> Option<&str> {
        self.table_id.as_deref()
    }

    /// Switch the subscribed table. Exactly one join per id change; a
    /// repeated call with the current id does nothing. The manager
    /// notifies the server about the table being left.
    pub async fn set_table(&mut self, table_id: Option<&str>) {
        if self.table_id.as_deref() == table_id {
            return;
        }
        match table_id {
            Some(id) => {
                debug!(table = %id, "Joining table");
                self.client.join_table(id).await;
                self.table_id = Some(id.to_string());
            }
            None => {
                debug!("Leaving table");
                self.client.leave_table().await;
                self.table_id = None;
            }
        }
        // Log and presence are scoped to the table.
        self.log = EventLog::default();
        self.presence = PresenceSet::default();
    }

    /// Feed one event from the client's stream into the room state.
    pub fn handle_event(&mut self, event: &ClientEvent) {
        let ClientEvent::Message(frame) = event else {
            return;
        };
        match frame.classify() {
            EventKind::PresenceUpdate { users } => self.presence.replace(users),
            EventKind::UserJoined { user_id } => {
                self.presence.add(&user_id);
            }
            EventKind::UserLeft { user_id } => {
                self.presence.remove(&user_id);
            }
            _ => {}
        }
        self.log.push(frame.clone());
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn presence(&self) -> &PresenceSet {
        &self.presence
    }

    /// Leave the active table, if any.
    pub async fn close(&mut self) {
        if self.table_id.take().is_some() {
            self.client.leave_table().await;
        }
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        // Best-effort: the leave is simply dropped by the manager when
        // the connection is down.
        if self.table_id.take().is_some() {
            self.client.try_leave_table();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::{broadcast, mpsc, RwLock};

    use crate::client::{frame_types, Command, ConnectionState, Frame, RealtimeClient};

    use super::*;

    /// A client handle wired to raw channels, with no connection task:
    /// lets tests observe exactly which commands were issued.
    fn detached_client() -> (RealtimeClient, mpsc::Receiver<Command>) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, _) = broadcast::channel(16);
        let client = RealtimeClient {
            command_tx,
            event_tx,
            state: Arc::new(RwLock::new(ConnectionState::new(10))),
        };
        (client, command_rx)
    }

    fn message(kind: &str, payload: serde_json::Value) -> ClientEvent {
        ClientEvent::Message(Frame::new(kind, Some(payload)))
    }

    #[tokio::test]
    async fn join_happens_once_per_table_change() {
        let (client, mut commands) = detached_client();
        let mut room = RoomSubscription::new(client);

        room.set_table(Some("tbl_42")).await;
        room.set_table(Some("tbl_42")).await;
        room.set_table(Some("tbl_42")).await;

        assert!(matches!(
            commands.try_recv().unwrap(),
            Command::JoinTable { table_id } if table_id == "tbl_42"
        ));
        assert!(commands.try_recv().is_err());
    }

    #[tokio::test]
    async fn clearing_the_table_leaves() {
        let (client, mut commands) = detached_client();
        let mut room = RoomSubscription::new(client);

        room.set_table(Some("tbl_42")).await;
        room.set_table(None).await;

        assert!(matches!(
            commands.try_recv().unwrap(),
            Command::JoinTable { .. }
        ));
        assert!(matches!(
            commands.try_recv().unwrap(),
            Command::LeaveTable
        ));
    }

    #[tokio::test]
    async fn drop_leaves_best_effort() {
        let (client, mut commands) = detached_client();
        let mut room = RoomSubscription::new(client);
        room.set_table(Some("tbl_42")).await;
        drop(room);

        assert!(matches!(
            commands.try_recv().unwrap(),
            Command::JoinTable { .. }
        ));
        assert!(matches!(
            commands.try_recv().unwrap(),
            Command::LeaveTable
        ));
    }

    #[tokio::test]
    async fn presence_derives_from_events() {
        let (client, _commands) = detached_client();
        let mut room = RoomSubscription::new(client);

        room.handle_event(&message(
            frame_types::PRESENCE_UPDATE,
            serde_json::json!({ "users": ["u1", "u2"] }),
        ));
        assert_eq!(room.presence().len(), 2);

        room.handle_event(&message(
            frame_types::USER_JOINED,
            serde_json::json!({ "userId": "u3" }),
        ));
        room.handle_event(&message(
            frame_types::USER_JOINED,
            serde_json::json!({ "userId": "u3" }),
        ));
        assert_eq!(room.presence().len(), 3);

        room.handle_event(&message(
            frame_types::USER_LEFT,
            serde_json::json!({ "userId": "u2" }),
        ));
        room.handle_event(&message(
            frame_types::USER_LEFT,
            serde_json::json!({ "userId": "missing" }),
        ));
        assert_eq!(room.presence().len(), 2);
        assert!(room.presence().contains("u1"));
        assert!(room.presence().contains("u3"));
    }

    #[tokio::test]
    async fn log_accumulates_all_messages() {
        let (client, _commands) = detached_client();
        let mut room = RoomSubscription::new(client);

        room.handle_event(&message(
            frame_types::RECORD_UPDATED,
            serde_json::json!({ "recordId": "rec_1" }),
        ));
        room.handle_event(&message(
            frame_types::PRESENCE_UPDATE,
            serde_json::json!({ "users": [] }),
        ));
        room.handle_event(&ClientEvent::Connected);

        assert_eq!(room.events().len(), 2);
        assert_eq!(room.events().latest().unwrap().kind, "presence_update");
    }

    #[tokio::test]
    async fn switching_tables_resets_scoped_state() {
        let (client, _commands) = detached_client();
        let mut room = RoomSubscription::new(client);

        room.set_table(Some("tbl_42")).await;
        room.handle_event(&message(
            frame_types::USER_JOINED,
            serde_json::json!({ "userId": "u1" }),
        ));
        assert_eq!(room.events().len(), 1);

        room.set_table(Some("tbl_99")).await;
        assert!(room.events().is_empty());
        assert!(room.presence().is_empty());
    }
}
