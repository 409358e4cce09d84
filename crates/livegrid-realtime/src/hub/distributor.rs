//! One realtime client per application lifetime, handed out by reference.

use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use livegrid_common::Toast;

use crate::client::{ConnectionStatus, RealtimeClient, RealtimeConfig};

use super::notifier::{notifier_loop, Notifier};

struct HubInner {
    client: RealtimeClient,
    notifier: Arc<Mutex<Notifier>>,
}

/// Owns the single client instance and the toast-translation task.
///
/// Constructed once the caller identity is available and injected into
/// consumers (no ambient global); consumers hold [`HubHandle`]s.
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl RealtimeHub {
    /// Start the hub: spawn the client, wire the notifier, and issue the
    /// initial connect (a no-op until an identity is configured).
    pub async fn start(config: RealtimeConfig) -> Self {
        let client = RealtimeClient::start(config);
        let notifier = Arc::new(Mutex::new(Notifier::default()));

        tokio::spawn(notifier_loop(client.subscribe(), Arc::clone(&notifier)));
        client.connect().await;

        Self {
            inner: Arc::new(HubInner { client, notifier }),
        }
    }

    /// A cloneable handle valid for the hub's lifetime.
    pub fn handle(&self) -> HubHandle {
        HubHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// A lightweight client handle onto the hub's connection.
    pub fn client(&self) -> RealtimeClient {
        self.inner.client.clone_sender()
    }

    /// Status as surfaced to the UI. Derived, not independently stored:
    /// the manager's advisory `Error` state never appears here.
    pub async fn connection_status(&self) -> ConnectionStatus {
        derived_status(&self.inner.client).await
    }

    /// Currently visible toasts, oldest first.
    pub async fn visible_toasts(&self) -> Vec<Toast> {
        self.inner.notifier.lock().await.visible()
    }

    /// Close the connection, suppressing auto-reconnect.
    pub async fn shutdown(&self) {
        self.inner.client.disconnect().await;
    }
}

async fn derived_status(client: &RealtimeClient) -> ConnectionStatus {
    let snapshot = client.snapshot().await;
    if snapshot.is_connected() {
        ConnectionStatus::Connected
    } else if snapshot.reconnect_attempts() > 0 {
        ConnectionStatus::Connecting
    } else {
        ConnectionStatus::Disconnected
    }
}

/// Weak handle to the hub for arbitrary consumers.
#[derive(Clone)]
pub struct HubHandle {
    inner: Weak<HubInner>,
}

impl HubHandle {
    /// Using a handle after the hub is gone is a programming error, not
    /// a recoverable runtime condition.
    fn inner(&self) -> Arc<HubInner> {
        self.inner
            .upgrade()
            .expect("realtime hub handle used after the hub was dropped")
    }

    pub fn client(&self) -> RealtimeClient {
        self.inner().client.clone_sender()
    }

    pub async fn connection_status(&self) -> ConnectionStatus {
        derived_status(&self.inner().client).await
    }

    pub async fn visible_toasts(&self) -> Vec<Toast> {
        self.inner().notifier.lock().await.visible()
    }
}
