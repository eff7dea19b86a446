//! WebSocket connection loop: dials the relay server, decodes inbound
//! frames into the dispatcher, and reconnects forever on any disconnect.
//! Grounded on the corpus's own WebSocket event bridge (`docker/ws.rs`),
//! generalized from a local Docker socket to a public `wss://` relay.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vibecheck_core::{AgentConfig, Clock};
use vibecheck_wire::{decode_inbound, AgentMessage};

use crate::dispatch::{AgentState, GateMessage, Outbox, QueryFinished};
use crate::env::{ping_interval, reconnect_delay};
use crate::scheduler::POLL_INTERVAL_SECS;
use crate::sdk::ClaudeSdkClient;

/// Outbox backed by an unbounded channel drained by the write half of the
/// current socket. Sends are fire-and-forget, per the shared-resource
/// policy: a message to a socket that has already gone away is simply
/// never written.
struct WsOutbox {
    tx: mpsc::UnboundedSender<AgentMessage>,
}

impl Outbox for WsOutbox {
    fn send(&self, message: AgentMessage) {
        let _ = self.tx.send(message);
    }
}

enum ConnectionOutcome {
    Disconnected,
    Shutdown,
}

/// Run the agent until `shutdown` fires. Owns `state` for the whole process
/// lifetime; only the socket itself is torn down and redialed on failure.
pub async fn run<C, Clk>(
    config: AgentConfig,
    mut state: AgentState<C, Clk>,
    mut gate_rx: mpsc::UnboundedReceiver<GateMessage>,
    mut result_rx: mpsc::UnboundedReceiver<QueryFinished>,
    shutdown: CancellationToken,
) where
    C: ClaudeSdkClient + 'static,
    Clk: Clock + 'static,
{
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        match connect_and_serve(&config, &mut state, &mut gate_rx, &mut result_rx, &shutdown).await {
            ConnectionOutcome::Shutdown => return,
            ConnectionOutcome::Disconnected => {
                warn!("connection to relay server lost, reconnecting in {:?}", reconnect_delay());
            }
        }
        tokio::select! {
            _ = tokio::time::sleep(reconnect_delay()) => {}
            _ = shutdown.cancelled() => return,
        }
    }
}

async fn connect_and_serve<C, Clk>(
    config: &AgentConfig,
    state: &mut AgentState<C, Clk>,
    gate_rx: &mut mpsc::UnboundedReceiver<GateMessage>,
    result_rx: &mut mpsc::UnboundedReceiver<QueryFinished>,
    shutdown: &CancellationToken,
) -> ConnectionOutcome
where
    C: ClaudeSdkClient + 'static,
    Clk: Clock + 'static,
{
    let url = config.connect_url();
    let ws_stream = match tokio_tungstenite::connect_async(&url).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(error = %e, "failed to connect to relay server");
            return ConnectionOutcome::Disconnected;
        }
    };
    info!(server = %config.server_url, "connected to relay server");

    let (mut write, mut read) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<AgentMessage>();
    let outbox: Arc<dyn Outbox> = Arc::new(WsOutbox { tx: out_tx });

    outbox.send(AgentMessage::SessionSync {
        work_dir: state.work_dir.display().to_string(),
        session_id: state.session.id().map(|id| id.as_str().to_string()),
    });

    let mut ping_timer = tokio::time::interval(ping_interval());
    ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut scheduler_timer = tokio::time::interval(Duration::from_secs(POLL_INTERVAL_SECS));
    scheduler_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => return ConnectionOutcome::Shutdown,

            Some(frame) = out_rx.recv() => {
                match serde_json::to_string(&frame) {
                    Ok(text) => {
                        if write.send(Message::Text(text.into())).await.is_err() {
                            return ConnectionOutcome::Disconnected;
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to encode outbound frame"),
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match decode_inbound(&text) {
                        Ok(Some(server_msg)) => state.handle_server_message(server_msg, &outbox),
                        Ok(None) => {} // unknown `type`: forward-compatible no-op
                        Err(e) => warn!(error = %e, "dropping malformed frame"),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        info!(?frame, "relay server closed the connection");
                        return ConnectionOutcome::Disconnected;
                    }
                    Some(Ok(_)) => {} // ping/pong/binary frames handled by tungstenite itself
                    Some(Err(e)) => {
                        warn!(error = %e, "relay socket error");
                        return ConnectionOutcome::Disconnected;
                    }
                    None => return ConnectionOutcome::Disconnected,
                }
            }

            Some(gate_msg) = gate_rx.recv() => state.handle_gate_message(gate_msg, &outbox),

            Some(finished) = result_rx.recv() => state.handle_query_finished(finished, &outbox).await,

            _ = ping_timer.tick() => outbox.send(AgentMessage::Ping),

            _ = scheduler_timer.tick() => state.tick_scheduler(&outbox),
        }
    }
}
