use crate::domain::EntityId;
use crate::interface_adapters::protocol::{
    ChatDto, ClientMessage, InitDto, JoinPayload, ServerMessage, SnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{ChatLine, GameEvent, JoinAccepted, RealmHandle, RelayEvent, WorldUpdate};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    JoinTimeout,
    ClosedBeforeJoin,
    InputClosed,
    WorldUpdatesClosed,
    RelayClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_INVALID_JSON: u32 = 10;
const MAX_DISPLAY_NAME_LEN: usize = 32;
const MAX_CHAT_LEN: usize = 240;
const DEFAULT_DISPLAY_NAME: &str = "Player";

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Process-unique id for correlating a connection's logs before it has a player.
fn next_conn_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each snapshot once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::Snapshot(SnapshotDto::from(update.as_ref()));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize snapshot");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                // Store the latest bytes for lag recovery.
                let _ = world_latest_tx.send(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_realm_serializer(realm: &RealmHandle) {
    tokio::spawn(world_update_serializer(
        realm.world_tx.subscribe(),
        realm.world_bytes_tx.clone(),
        realm.world_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = next_conn_id();
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, state, span.clone()).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, span: tracing::Span) {
    let mut ctx = match bootstrap_connection(&mut socket, &state).await {
        Ok(ctx) => ctx,
        Err(e) => {
            let reason = match e {
                NetError::JoinTimeout => "join timeout",
                _ => "bootstrap failed",
            };
            warn!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: reason.into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    span.record("player_id", ctx.player_id.0);
    info!(class = ctx.class_name, "client connected");

    // Main Client Loop
    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    // Count lag recovery snapshots sent to this client.
    lag_recovery_count: u64,
}

struct LogGates {
    input_full: Instant,
    world_lag: Instant,
    relay_lag: Instant,
    invalid_input: Instant,
}

impl LogGates {
    fn new() -> Self {
        let now = Instant::now() - LOG_THROTTLE;
        Self {
            input_full: now,
            world_lag: now,
            relay_lag: now,
            invalid_input: now,
        }
    }
}

struct ConnCtx {
    player_id: EntityId,
    class_name: &'static str,
    input_tx: mpsc::Sender<GameEvent>,
    relay_tx: broadcast::Sender<RelayEvent>,
    world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    world_latest_rx: watch::Receiver<Utf8Bytes>,
    relay_rx: broadcast::Receiver<RelayEvent>,
    stats: ConnStats,
    gates: LogGates,
    close_frame: Option<CloseFrame>,
}

fn sanitize_display_name(raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_DISPLAY_NAME_LEN {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        name.to_string()
    }
}

// Reads frames until the client sends Join. Anything else before it is ignored.
async fn wait_for_join(socket: &mut WebSocket) -> Result<JoinPayload, NetError> {
    loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => return Ok(payload),
                    Ok(_) => debug!("message before join ignored"),
                    Err(e) => debug!(error = %e, "unparseable message before join"),
                }
            }
            Some(Ok(Message::Close(_))) | None => return Err(NetError::ClosedBeforeJoin),
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(NetError::Ws(e)),
        }
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
) -> Result<ConnCtx, NetError> {
    let realm = &state.realm;

    // Subscribe to updates *before* doing anything else (awaits) to not miss packets.
    let world_bytes_rx = realm.world_bytes_tx.subscribe();
    let world_latest_rx = realm.world_latest_tx.subscribe();
    let relay_rx = realm.relay_tx.subscribe();

    let join = tokio::time::timeout(JOIN_TIMEOUT, wait_for_join(socket))
        .await
        .map_err(|_| NetError::JoinTimeout)??;
    let display_name = sanitize_display_name(&join.display_name);

    // The world spawns the player and answers with its id and class.
    let (reply, reply_rx) = oneshot::channel();
    realm
        .input_tx
        .send(GameEvent::Join {
            display_name,
            reply,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let JoinAccepted { player_id, class } = reply_rx.await.map_err(|_| NetError::InputClosed)?;

    let init = ServerMessage::Init(InitDto {
        me_id: player_id.0,
        tick_rate: state.tick_rate,
        player_class: class.as_str(),
    });
    if let Err(e) = send_message(socket, &init).await {
        // Compensate so the world doesn't keep a player nobody controls.
        realm
            .input_tx
            .send(GameEvent::Leave { player_id })
            .await
            .map_err(|_| NetError::InputClosed)?; // InputClosed takes precedence
        return Err(e);
    }

    Ok(ConnCtx {
        player_id,
        class_name: class.as_str(),
        input_tx: realm.input_tx.clone(),
        relay_tx: realm.relay_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        relay_rx,
        stats: ConnStats::default(),
        gates: LogGates::new(),
        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

// Queues a gameplay event without blocking the connection on a busy world.
fn forward_event(
    player_id: EntityId,
    input_tx: &mpsc::Sender<GameEvent>,
    event: GameEvent,
    last_input_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match input_tx.try_send(event) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_evt)) => {
            if should_log(last_input_full_log) {
                warn!(%player_id, "input channel full; dropping event");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_evt)) => Err(NetError::InputClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        input_tx,
        relay_tx,
        world_bytes_rx,
        world_latest_rx,
        relay_rx,
        stats,
        gates,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    input_tx,
                    relay_tx,
                    stats,
                    gates,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            world_msg = world_bytes_rx.recv() => {
                match world_msg {
                    Ok(bytes) => match forward_world_bytes(bytes, socket, stats).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut gates.world_lag) {
                            warn!(missed = n, "world updates lagged; sending snapshot");
                        }

                        // Resync strategy: send the latest world snapshot.
                        let latest = world_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            false
                        } else {
                            stats.lag_recovery_count += 1;
                            match forward_world_bytes(latest, socket, stats).await {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::WorldUpdatesClosed);
                        true
                    }
                }
            }

            relayed = relay_rx.recv() => {
                match relayed {
                    Ok(event) => {
                        let msg = match event {
                            RelayEvent::Chat(line) => ServerMessage::Chat(ChatDto::from(&line)),
                            RelayEvent::Disconnect { player_id: gone } => {
                                ServerMessage::Disconnect { id: gone.0 }
                            }
                        };
                        match send_message(socket, &msg).await {
                            Ok(bytes) => {
                                stats.msgs_out += 1;
                                stats.bytes_out += bytes as u64;
                                false
                            }
                            Err(err) => {
                                warn!(error = ?err, "failed to relay message");
                                true
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut gates.relay_lag) {
                            warn!(missed = n, "relay lagged; dropping chat lines");
                        }
                        false
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::RelayClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(player_id, input_tx, relay_tx, stats).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_client_message(
    msg: ClientMessage,
    player_id: EntityId,
    input_tx: &mpsc::Sender<GameEvent>,
    relay_tx: &broadcast::Sender<RelayEvent>,
    gates: &mut LogGates,
) -> Result<LoopControl, NetError> {
    match msg {
        ClientMessage::Join(_) => {
            debug!(%player_id, "duplicate join ignored");
            Ok(LoopControl::Continue)
        }
        ClientMessage::Input(input) => forward_event(
            player_id,
            input_tx,
            GameEvent::Input {
                player_id,
                input: input.into(),
            },
            &mut gates.input_full,
        ),
        ClientMessage::SkillUpgrade(upgrade) => forward_event(
            player_id,
            input_tx,
            GameEvent::SkillUpgrade {
                player_id,
                stat: upgrade.stat,
            },
            &mut gates.input_full,
        ),
        ClientMessage::Inventory(action) => {
            let Some(action) = action.to_action() else {
                if should_log(&mut gates.invalid_input) {
                    warn!(%player_id, "invalid inventory slot reference");
                }
                return Ok(LoopControl::Continue);
            };
            forward_event(
                player_id,
                input_tx,
                GameEvent::Inventory { player_id, action },
                &mut gates.input_full,
            )
        }
        ClientMessage::Chat(chat) => {
            let text = chat.text.trim();
            if !text.is_empty() {
                let text: String = text.chars().take(MAX_CHAT_LEN).collect();
                // No receivers only means nobody else is listening.
                let _ = relay_tx.send(RelayEvent::Chat(ChatLine {
                    player_id,
                    text,
                    ts: now_millis(),
                }));
            }
            Ok(LoopControl::Continue)
        }
    }
}

fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: EntityId,
    input_tx: &mpsc::Sender<GameEvent>,
    relay_tx: &broadcast::Sender<RelayEvent>,
    stats: &mut ConnStats,
    gates: &mut LogGates,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                stats.msgs_in += 1;
                stats.bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(msg) => handle_client_message(msg, player_id, input_tx, relay_tx, gates),
                    Err(parse_err) => {
                        stats.invalid_json += 1;
                        if should_log(&mut gates.invalid_input) {
                            warn!(
                                %player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if stats.invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
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
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(%player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(%player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_world_bytes(
    world_msg: Utf8Bytes,
    socket: &mut WebSocket,
    stats: &mut ConnStats,
) -> LoopControl {
    let bytes_len = world_msg.len();
    match socket
        .send(Message::Text(world_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            stats.msgs_out += 1;
            stats.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(
    player_id: EntityId,
    input_tx: &mpsc::Sender<GameEvent>,
    relay_tx: &broadcast::Sender<RelayEvent>,
    stats: &ConnStats,
) -> Result<(), NetError> {
    input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let _ = relay_tx.send(RelayEvent::Disconnect { player_id });

    debug!(
        %player_id,
        msgs_in = stats.msgs_in,
        msgs_out = stats.msgs_out,
        bytes_in = stats.bytes_in,
        bytes_out = stats.bytes_out,
        invalid_json = stats.invalid_json,
        lag_recovery_count = stats.lag_recovery_count,
        "connection stats"
    );
    info!(%player_id, "client disconnected");
    Ok(())
}
