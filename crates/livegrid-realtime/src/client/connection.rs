//! Background WebSocket connection loop with bounded fixed-interval reconnect.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use livegrid_common::TransportError;

use super::handler::handle_text_frame;
use super::state::{ConnectionState, RetryDecision};
use super::types::{frame_types, now_ms, ClientEvent, Command, Frame, RealtimeConfig};

/// Delay between an explicit reconnect request and the fresh connect,
/// letting the old transport fully release.
const RECONNECT_HANDOFF: Duration = Duration::from_millis(100);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;

/// The one table the caller has declared interest in. Updated even while
/// disconnected so the join can be replayed on the next connection.
#[derive(Debug, Default)]
struct TableSubscription {
    table_id: Option<String>,
}

enum SessionEnd {
    /// Transport closed or errored out.
    Closed,
    /// Caller asked for a fresh transport.
    Reconnect,
    /// All client handles dropped.
    Shutdown,
}

enum LoopSignal {
    Idle,
    Shutdown,
}

enum RetryWait {
    Proceed,
    Cancelled,
    Shutdown,
}

// ---------------------------------------------------------------------------
// Connection Loop
// ---------------------------------------------------------------------------

/// Background task owning the single transport. Sits idle in
/// `disconnected` until an explicit connect command arrives.
pub(crate) async fn connection_loop(
    config: RealtimeConfig,
    state: Arc<RwLock<ConnectionState>>,
    event_tx: broadcast::Sender<ClientEvent>,
    mut command_rx: mpsc::Receiver<Command>,
) {
    let mut subscription = TableSubscription::default();

    while let Some(cmd) = command_rx.recv().await {
        let signal = match cmd {
            Command::Connect => {
                run_connected(&config, &state, &event_tx, &mut command_rx, &mut subscription).await
            }
            Command::Reconnect => {
                tokio::time::sleep(RECONNECT_HANDOFF).await;
                run_connected(&config, &state, &event_tx, &mut command_rx, &mut subscription).await
            }
            Command::Disconnect => {
                debug!("Disconnect requested while already disconnected");
                LoopSignal::Idle
            }
            other => {
                drop_while_disconnected(other, &mut subscription);
                LoopSignal::Idle
            }
        };
        if let LoopSignal::Shutdown = signal {
            return;
        }
    }
}

/// Sends issued while no transport is open are dropped, never queued.
/// Join/leave still update the local subscription record.
fn drop_while_disconnected(cmd: Command, subscription: &mut TableSubscription) {
    match cmd {
        Command::Send { kind, .. } => {
            debug!(kind = %kind, "Dropping message, not connected");
        }
        Command::JoinTable { table_id } => {
            debug!(table = %table_id, "Join recorded, not connected");
            subscription.table_id = Some(table_id);
        }
        Command::LeaveTable => {
            debug!("Leave recorded, not connected");
            subscription.table_id = None;
        }
        _ => {}
    }
}

/// Connect-and-retry phase: runs until the caller disconnects, the
/// attempt budget is exhausted, or a setup error surfaces.
async fn run_connected(
    config: &RealtimeConfig,
    state: &Arc<RwLock<ConnectionState>>,
    event_tx: &broadcast::Sender<ClientEvent>,
    command_rx: &mut mpsc::Receiver<Command>,
    subscription: &mut TableSubscription,
) -> LoopSignal {
    if !config.has_identity() {
        debug!("Connect requested without a user identity, ignoring");
        return LoopSignal::Idle;
    }
    if !state.write().await.begin_connect() {
        debug!("Already connected, ignoring connect");
        return LoopSignal::Idle;
    }

    loop {
        match open_transport(config).await {
            Ok(ws) => {
                state.write().await.on_open(now_ms());
                info!(url = %config.endpoint, "Connected");
                let _ = event_tx.send(ClientEvent::Connected);

                let end = run_session(ws, config, state, event_tx, command_rx, subscription).await;
                if let SessionEnd::Shutdown = end {
                    return LoopSignal::Shutdown;
                }

                let decision = state.write().await.on_close();
                let _ = event_tx.send(ClientEvent::Disconnected);

                match end {
                    SessionEnd::Reconnect => {
                        tokio::time::sleep(RECONNECT_HANDOFF).await;
                        if !state.write().await.begin_connect() {
                            return LoopSignal::Idle;
                        }
                    }
                    SessionEnd::Closed => match decision {
                        RetryDecision::Stop => {
                            info!("Disconnected");
                            return LoopSignal::Idle;
                        }
                        RetryDecision::GiveUp => {
                            warn!(
                                attempts = config.max_reconnect_attempts,
                                "Reconnect budget exhausted, staying disconnected"
                            );
                            return LoopSignal::Idle;
                        }
                        RetryDecision::Retry { attempt } => {
                            warn!(attempt, "Connection lost, scheduling reconnect");
                            match wait_for_retry(config, state, command_rx, subscription).await {
                                RetryWait::Proceed => {}
                                RetryWait::Cancelled => return LoopSignal::Idle,
                                RetryWait::Shutdown => return LoopSignal::Shutdown,
                            }
                        }
                    },
                    SessionEnd::Shutdown => unreachable!("handled above"),
                }
            }
            Err(err) if err.is_setup() => {
                // The transport could not even be constructed. Fatal for
                // this session; surfaced via logs, never retried.
                error!(error = %err, "Failed to construct transport");
                state.write().await.on_setup_failure();
                let _ = event_tx.send(ClientEvent::Error(err.to_string()));
                return LoopSignal::Idle;
            }
            Err(err) => {
                warn!(error = %err, "Connect attempt failed");
                let _ = event_tx.send(ClientEvent::Error(err.to_string()));
                match state.write().await.on_close() {
                    RetryDecision::Stop => return LoopSignal::Idle,
                    RetryDecision::GiveUp => {
                        warn!(
                            attempts = config.max_reconnect_attempts,
                            "Reconnect budget exhausted, staying disconnected"
                        );
                        return LoopSignal::Idle;
                    }
                    RetryDecision::Retry { attempt } => {
                        debug!(attempt, "Scheduling reconnect");
                        match wait_for_retry(config, state, command_rx, subscription).await {
                            RetryWait::Proceed => {}
                            RetryWait::Cancelled => return LoopSignal::Idle,
                            RetryWait::Shutdown => return LoopSignal::Shutdown,
                        }
                    }
                }
            }
        }
    }
}

/// Sleep out the fixed reconnect interval while staying responsive to
/// commands. The pending timer is the only cancellable unit of work.
async fn wait_for_retry(
    config: &RealtimeConfig,
    state: &Arc<RwLock<ConnectionState>>,
    command_rx: &mut mpsc::Receiver<Command>,
    subscription: &mut TableSubscription,
) -> RetryWait {
    let delay = tokio::time::sleep(Duration::from_millis(config.reconnect_interval_ms));
    tokio::pin!(delay);

    loop {
        tokio::select! {
            _ = &mut delay => return RetryWait::Proceed,
            cmd = command_rx.recv() => match cmd {
                None => return RetryWait::Shutdown,
                Some(Command::Disconnect) => {
                    info!("Disconnect requested, cancelling pending reconnect");
                    state.write().await.cancel_retry();
                    return RetryWait::Cancelled;
                }
                Some(Command::Connect) => return RetryWait::Proceed,
                Some(Command::Reconnect) => {
                    tokio::time::sleep(RECONNECT_HANDOFF).await;
                    return RetryWait::Proceed;
                }
                Some(other) => drop_while_disconnected(other, subscription),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

async fn open_transport(config: &RealtimeConfig) -> Result<WsStream, TransportError> {
    let url = config.ws_url();
    info!(url = %config.endpoint, "Connecting");

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        tokio_tungstenite::connect_async(&url),
    )
    .await
    {
        Ok(Ok((ws, _))) => Ok(ws),
        Ok(Err(e)) => Err(classify_connect_error(e)),
        Err(_elapsed) => Err(TransportError::Timeout(config.connect_timeout_secs)),
    }
}

/// A URL-level failure means no transport ever existed (the setup-error
/// class); everything else is a transient network failure.
fn classify_connect_error(err: WsError) -> TransportError {
    match err {
        WsError::Url(e) => TransportError::InvalidEndpoint(e.to_string()),
        other => TransportError::ConnectFailed(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One live transport: commands out, frames in, keepalive pings on a
/// fixed interval. Returns when the transport goes away.
async fn run_session(
    ws: WsStream,
    config: &RealtimeConfig,
    state: &Arc<RwLock<ConnectionState>>,
    event_tx: &broadcast::Sender<ClientEvent>,
    command_rx: &mut mpsc::Receiver<Command>,
    subscription: &mut TableSubscription,
) -> SessionEnd {
    let (mut sink, mut stream) = ws.split();

    // Replay the active table join after a reconnect.
    if let Some(table_id) = subscription.table_id.clone() {
        info!(table = %table_id, "Rejoining table");
        send_frame(&mut sink, state, join_frame(&table_id)).await;
    }

    let mut ping = tokio::time::interval(Duration::from_secs(config.ping_interval_secs));
    // Skip the interval's immediate first tick.
    ping.reset();

    loop {
        tokio::select! {
            _ = ping.tick() => {
                send_frame(&mut sink, state, Frame::new(frame_types::PING, None)).await;
            }

            cmd = command_rx.recv() => match cmd {
                None => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }
                Some(Command::Connect) => {
                    debug!("Already connected, ignoring connect");
                }
                Some(Command::Disconnect) => {
                    info!("Disconnecting");
                    state.write().await.mark_intentional();
                    let _ = sink.close().await;
                    return SessionEnd::Closed;
                }
                Some(Command::Reconnect) => {
                    info!("Reconnect requested, cycling transport");
                    state.write().await.mark_intentional();
                    let _ = sink.close().await;
                    return SessionEnd::Reconnect;
                }
                Some(Command::Send { kind, payload }) => {
                    send_frame(&mut sink, state, Frame::new(kind, payload)).await;
                }
                Some(Command::JoinTable { table_id }) => {
                    // Never switch tables without telling the server we
                    // left the previous one.
                    if let Some(prev) = subscription.table_id.clone() {
                        if prev != table_id {
                            send_frame(&mut sink, state, leave_frame(&prev)).await;
                        }
                    }
                    send_frame(&mut sink, state, join_frame(&table_id)).await;
                    subscription.table_id = Some(table_id);
                }
                Some(Command::LeaveTable) => match subscription.table_id.take() {
                    Some(table_id) => {
                        send_frame(&mut sink, state, leave_frame(&table_id)).await;
                    }
                    None => debug!("Leave requested with no active table"),
                },
            },

            frame = stream.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    handle_text_frame(&text, state, event_tx).await;
                }
                Some(Ok(WsMessage::Ping(data))) => {
                    let _ = sink.send(WsMessage::Pong(data)).await;
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Server closed connection");
                    return SessionEnd::Closed;
                }
                Some(Err(e)) => {
                    // Advisory: the close bookkeeping that follows is
                    // what drives the state transition.
                    warn!(error = %e, "WebSocket error");
                    state.write().await.on_error();
                    let _ = event_tx.send(ClientEvent::Error(e.to_string()));
                    return SessionEnd::Closed;
                }
                _ => {}
            }
        }
    }
}

async fn send_frame(sink: &mut WsSink, state: &Arc<RwLock<ConnectionState>>, frame: Frame) {
    match serde_json::to_string(&frame) {
        Ok(json) => {
            if sink.send(WsMessage::Text(json.into())).await.is_err() {
                warn!(kind = %frame.kind, "Send failed, connection going down");
            } else {
                state.write().await.record_sent();
            }
        }
        Err(e) => warn!(error = %e, "Failed to encode frame"),
    }
}

fn join_frame(table_id: &str) -> Frame {
    Frame::new(
        frame_types::JOIN_TABLE,
        Some(serde_json::json!({ "tableId": table_id })),
    )
}

fn leave_frame(table_id: &str) -> Frame {
    Frame::new(
        frame_types::LEAVE_TABLE,
        Some(serde_json::json!({ "tableId": table_id })),
    )
}
