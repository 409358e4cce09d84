//! Public handle for the realtime connection manager.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc, RwLock};

use super::connection::connection_loop;
use super::state::ConnectionState;
use super::types::{ClientEvent, Command, RealtimeConfig};

/// Handle for the background connection task.
///
/// All methods are fire-and-forget: they enqueue a command and return.
/// Sends issued while disconnected are dropped by the task, never
/// queued — delivery is best-effort by contract.
pub struct RealtimeClient {
    pub(crate) command_tx: mpsc::Sender<Command>,
    pub(crate) event_tx: broadcast::Sender<ClientEvent>,
    pub(crate) state: Arc<RwLock<ConnectionState>>,
}

impl RealtimeClient {
    /// Spawn the background connection task. The task stays inert until
    /// `connect` is called with an identity configured.
    pub fn start(config: RealtimeConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (event_tx, _) = broadcast::channel(256);
        let state = Arc::new(RwLock::new(ConnectionState::new(
            config.max_reconnect_attempts,
        )));

        tokio::spawn(connection_loop(
            config,
            Arc::clone(&state),
            event_tx.clone(),
            command_rx,
        ));

        Self {
            command_tx,
            event_tx,
            state,
        }
    }

    /// Clone a lightweight handle onto the same connection.
    pub fn clone_sender(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            event_tx: self.event_tx.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Subscribe to the event stream. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.event_tx.subscribe()
    }

    /// Open the connection. No-op while already connected or when no
    /// identity is configured.
    pub async fn connect(&self) {
        let _ = self.command_tx.send(Command::Connect).await;
    }

    /// Close the connection and suppress auto-reconnect.
    pub async fn disconnect(&self) {
        let _ = self.command_tx.send(Command::Disconnect).await;
    }

    /// Cycle the transport: disconnect, then a fresh connect after a
    /// short handoff delay.
    pub async fn reconnect(&self) {
        let _ = self.command_tx.send(Command::Reconnect).await;
    }

    /// Send an application message. Dropped with a debug log if the
    /// connection is down.
    pub async fn send_message(&self, kind: &str, payload: Option<Value>) {
        let _ = self
            .command_tx
            .send(Command::Send {
                kind: kind.to_string(),
                payload,
            })
            .await;
    }

    /// Declare interest in one table. Joining a new table while another
    /// is active leaves the previous one first.
    pub async fn join_table(&self, table_id: &str) {
        let _ = self
            .command_tx
            .send(Command::JoinTable {
                table_id: table_id.to_string(),
            })
            .await;
    }

    /// Retract interest in the active table, if any.
    pub async fn leave_table(&self) {
        let _ = self.command_tx.send(Command::LeaveTable).await;
    }

    /// Synchronous best-effort leave, for drop paths.
    pub(crate) fn try_leave_table(&self) {
        let _ = self.command_tx.try_send(Command::LeaveTable);
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.is_connected()
    }

    /// Point-in-time copy of the connection bookkeeping.
    pub async fn snapshot(&self) -> ConnectionState {
        self.state.read().await.clone()
    }
}
