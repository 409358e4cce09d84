//! Process-wide distributor: wraps exactly one realtime client, derives
//! a UI-facing connection status, and turns record events into toasts.

mod distributor;
mod notifier;

pub use distributor::{HubHandle, RealtimeHub};
