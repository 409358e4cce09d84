//! Background task translating client events into user-visible toasts.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use livegrid_common::{Toast, ToastQueue};

use crate::client::{ClientEvent, EventKind, Frame, RecordChange};

/// Toast policy: record changes surface unless the payload opts out,
/// and consecutive duplicates of the immediately preceding toast are
/// suppressed (no deeper dedup history).
#[derive(Debug, Default)]
pub(crate) struct Notifier {
    queue: ToastQueue,
    last_text: Option<String>,
}

impl Notifier {
    pub(crate) fn handle_event(&mut self, event: &ClientEvent) {
        match event {
            ClientEvent::Connected => debug!("Realtime connected"),
            ClientEvent::Disconnected => {
                self.toast(Toast::warning("Realtime connection lost"));
            }
            ClientEvent::Error(msg) => {
                self.toast(Toast::error(format!("Realtime error: {msg}")));
            }
            ClientEvent::Message(frame) => self.handle_message(frame),
        }
    }

    fn handle_message(&mut self, frame: &Frame) {
        let text = match frame.classify() {
            EventKind::RecordCreated(change) => describe(&change, "created"),
            EventKind::RecordUpdated(change) => describe(&change, "updated"),
            EventKind::RecordDeleted(change) => describe(&change, "deleted"),
            _ => return,
        };
        let Some(text) = text else {
            // The event explicitly asked for silence.
            return;
        };
        self.toast(Toast::info(text));
    }

    fn toast(&mut self, toast: Toast) {
        if self.last_text.as_deref() == Some(toast.text.as_str()) {
            debug!(text = %toast.text, "Suppressing duplicate toast");
            return;
        }
        self.last_text = Some(toast.text.clone());
        self.queue.push(toast);
    }

    pub(crate) fn visible(&mut self) -> Vec<Toast> {
        self.queue.visible().into_iter().cloned().collect()
    }
}

fn describe(change: &RecordChange, verb: &str) -> Option<String> {
    if !change.notify {
        return None;
    }
    Some(match &change.record_id {
        Some(id) => format!("Record {id} {verb}"),
        None => format!("Record {verb}"),
    })
}

pub(crate) async fn notifier_loop(
    mut events: broadcast::Receiver<ClientEvent>,
    notifier: Arc<Mutex<Notifier>>,
) {
    loop {
        match events.recv().await {
            Ok(event) => notifier.lock().await.handle_event(&event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "Notifier lagged behind the event stream");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
