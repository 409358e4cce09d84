mod cli;

use livegrid_realtime::{ClientEvent, RealtimeConfig, RealtimeHub, RoomSubscription};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("livegrid=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "livegrid=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("LiveGrid monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = RealtimeConfig {
        endpoint: args.endpoint,
        user_id: Some(args.user_id),
        ..Default::default()
    };

    let hub = RealtimeHub::start(config).await;
    let client = hub.client();
    let mut events = client.subscribe();

    let mut room = RoomSubscription::new(hub.client());
    if let Some(table) = args.table.as_deref() {
        room.set_table(Some(table)).await;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                room.close().await;
                hub.shutdown().await;
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    room.handle_event(&event);
                    match event {
                        ClientEvent::Connected => {
                            tracing::info!(status = ?hub.connection_status().await, "Connected");
                        }
                        ClientEvent::Disconnected => tracing::warn!("Disconnected"),
                        ClientEvent::Error(msg) => tracing::warn!(error = %msg, "Connection error"),
                        ClientEvent::Message(frame) => tracing::info!(
                            kind = %frame.kind,
                            logged = room.events().len(),
                            present = room.presence().len(),
                            "Event"
                        ),
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
