use crate::domain::{ConnectionId, SessionError};
use crate::interface_adapters::protocol::ClientMessage;
use crate::interface_adapters::state::{AppState, GameCoordinator};
use crate::interface_adapters::utils::ids::next_connection_id;

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_PLAYER_NAME_LEN: usize = 32;

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Ws(axum::Error),
    Session(SessionError),
}

impl From<SessionError> for NetError {
    fn from(e: SessionError) -> Self {
        NetError::Session(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

struct ConnCtx {
    conn_id: ConnectionId,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    last_invalid_input_log: Instant,
    close_frame: Option<CloseFrame>,
}

impl ConnCtx {
    fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id,
            msgs_in: 0,
            msgs_out: 0,
            bytes_in: 0,
            bytes_out: 0,
            invalid_json: 0,
            last_invalid_input_log: Instant::now() - LOG_THROTTLE,
            close_frame: None,
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = next_connection_id();
        handle_socket(socket, state, conn_id).instrument(info_span!("conn", conn_id))
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, conn_id: ConnectionId) {
    // Register before reading anything so broadcasts reach every open socket.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(state.outbound_capacity);
    state.hub().register(conn_id, outbound_tx).await;
    info!("client connected");

    let mut ctx = ConnCtx::new(conn_id);
    let result =
        run_client_loop(&mut socket, &mut outbound_rx, &state.coordinator, &mut ctx).await;
    if let Err(e) = result {
        match e {
            NetError::Session(err) => error!(error = %err, "session failure; closing connection"),
            NetError::Ws(err) => warn!(error = ?err, "client loop exited with error"),
        }
    }

    // Leave the hub first so the roster update is not queued for this socket.
    state.hub().unregister(conn_id).await;
    if let Err(e) = state.coordinator.disconnect(conn_id).await {
        error!(error = %e, "failed to remove player on disconnect");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        "connection stats"
    );
    info!("client disconnected");
}

async fn run_client_loop(
    socket: &mut WebSocket,
    outbound_rx: &mut mpsc::Receiver<Message>,
    coordinator: &GameCoordinator,
    ctx: &mut ConnCtx,
) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(incoming, coordinator, ctx).await {
                    Ok(control) => control,
                    Err(e) => {
                        fatal = Some(e);
                        LoopControl::Disconnect
                    }
                }
            }

            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(msg) => forward_outbound(msg, socket, ctx).await,
                    // The hub dropped this connection.
                    None => LoopControl::Disconnect,
                }
            }
        };

        if let LoopControl::Disconnect = control {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Trims the display name and caps its length. Empty names are refused.
fn sanitize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().chars().take(MAX_PLAYER_NAME_LEN).collect();
    let name = name.trim_end().to_string();
    if name.is_empty() { None } else { Some(name) }
}

fn sanitize_elapsed(time: f64) -> Option<f64> {
    (time.is_finite() && time >= 0.0).then_some(time)
}

async fn dispatch_client_message(
    msg: ClientMessage,
    coordinator: &GameCoordinator,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let conn_id = ctx.conn_id;
    match msg {
        ClientMessage::JoinGame(payload) => match sanitize_name(&payload.player_name) {
            Some(name) => coordinator.join(conn_id, name).await?,
            None => {
                if should_log(&mut ctx.last_invalid_input_log) {
                    warn!(conn_id, "empty player name; join ignored");
                }
            }
        },
        ClientMessage::StartGame => coordinator.start_game().await?,
        ClientMessage::ClickButton(payload) => match sanitize_elapsed(payload.time) {
            Some(elapsed) => coordinator.submit_action(conn_id, elapsed).await?,
            None => {
                if should_log(&mut ctx.last_invalid_input_log) {
                    warn!(conn_id, time = payload.time, "invalid turn time; dropping");
                }
            }
        },
        ClientMessage::EndGame => coordinator.end_game().await?,
    }
    Ok(LoopControl::Continue)
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    coordinator: &GameCoordinator,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let conn_id = ctx.conn_id;
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                ctx.msgs_in += 1;
                ctx.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => dispatch_client_message(msg, coordinator, ctx).await,
                    Err(parse_err) => {
                        ctx.invalid_json += 1;
                        if should_log(&mut ctx.last_invalid_input_log) {
                            warn!(
                                conn_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if ctx.invalid_json > MAX_INVALID_JSON {
                            ctx.close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(conn_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(conn_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_outbound(msg: Message, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let bytes_len = match &msg {
        Message::Text(text) => text.len(),
        _ => 0,
    };
    match socket.send(msg).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send notification");
            LoopControl::Disconnect
        }
    }
}
