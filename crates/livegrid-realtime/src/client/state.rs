//! Connection lifecycle bookkeeping, kept separate from transport I/O.

/// Lifecycle of the single physical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    /// Advisory only: a transport error was observed. The subsequent
    /// close drives the actual transition.
    Error,
}

/// What to do after the transport went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryDecision {
    /// Schedule reconnect attempt `attempt` after the fixed interval.
    Retry { attempt: u32 },
    /// Intentional disconnect; stay down.
    Stop,
    /// Attempt budget exhausted; stay down until an explicit connect.
    GiveUp,
}

/// Mutable bookkeeping for the one live transport. Owned by the
/// connection task, shared read-only with handles via `Arc<RwLock<_>>`.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    status: ConnectionStatus,
    reconnect_attempts: u32,
    last_connected_at: Option<i64>,
    messages_sent: u64,
    messages_received: u64,
    intentional: bool,
    max_reconnect_attempts: u32,
}

impl ConnectionState {
    pub(crate) fn new(max_reconnect_attempts: u32) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            reconnect_attempts: 0,
            last_connected_at: None,
            messages_sent: 0,
            messages_received: 0,
            intentional: false,
            max_reconnect_attempts,
        }
    }

    /// Begin an explicit connect. Returns false (no-op) when a transport
    /// is already live.
    pub(crate) fn begin_connect(&mut self) -> bool {
        if self.status == ConnectionStatus::Connected {
            return false;
        }
        self.status = ConnectionStatus::Connecting;
        self.intentional = false;
        true
    }

    /// Transport opened.
    pub(crate) fn on_open(&mut self, now_ms: i64) {
        self.status = ConnectionStatus::Connected;
        self.reconnect_attempts = 0;
        self.last_connected_at = Some(now_ms);
    }

    /// The disconnect that follows was requested by the caller; no
    /// reconnect should be scheduled for it.
    pub(crate) fn mark_intentional(&mut self) {
        self.intentional = true;
    }

    /// Transport-level error. Advisory: reconnection bookkeeping is
    /// untouched until the close arrives.
    pub(crate) fn on_error(&mut self) {
        self.status = ConnectionStatus::Error;
    }

    /// Transport closed (or a connect attempt failed). Decides whether
    /// a reconnect attempt is in budget.
    pub(crate) fn on_close(&mut self) -> RetryDecision {
        if self.intentional {
            self.intentional = false;
            self.status = ConnectionStatus::Disconnected;
            return RetryDecision::Stop;
        }
        if self.reconnect_attempts < self.max_reconnect_attempts {
            self.reconnect_attempts += 1;
            self.status = ConnectionStatus::Connecting;
            RetryDecision::Retry {
                attempt: self.reconnect_attempts,
            }
        } else {
            self.status = ConnectionStatus::Disconnected;
            RetryDecision::GiveUp
        }
    }

    /// A pending reconnect was cancelled by an explicit disconnect.
    pub(crate) fn cancel_retry(&mut self) {
        self.status = ConnectionStatus::Disconnected;
    }

    /// The transport could not even be constructed. Surfaced via logs,
    /// never retried.
    pub(crate) fn on_setup_failure(&mut self) {
        self.status = ConnectionStatus::Disconnected;
    }

    pub(crate) fn record_sent(&mut self) {
        self.messages_sent += 1;
    }

    pub(crate) fn record_received(&mut self) {
        self.messages_received += 1;
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    pub fn last_connected_at(&self) -> Option<i64> {
        self.last_connected_at
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }
}
