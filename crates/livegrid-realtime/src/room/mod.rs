//! Room subscriptions: interest in one table at a time, with a bounded
//! recent-event log and a presence set derived from inbound events.

mod event_log;
mod presence;
mod subscription;

pub use event_log::EventLog;
pub use presence::PresenceSet;
pub use subscription::RoomSubscription;
