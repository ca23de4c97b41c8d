//! Per-connection task (spec.md §4.6): authenticates against the External
//! App Service, binds the connection to a [`crate::session::SessionHandle`]
//! (creating one if needed), then forwards messages into the session's
//! inbound queue and writes the session's outputs back to this transport.
//! Message translation is purely mechanical; no chess logic lives here.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use chess_engine::Square;

use crate::app_service::AppService;
use crate::elo;
use crate::protocol::{ClientMessage, ProjectedElo, ServerMessage};
use crate::registry::SessionRegistry;
use crate::session::{PlayerId, SessionHandle};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();

    let bound = authenticate(&mut sink, &mut stream, &state).await;
    let Some((session, player_id, mut outbox_rx)) = bound else {
        return;
    };

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_message(&session, player_id, &text, &mut sink).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => break,
                }
            }
            outgoing = outbox_rx.recv() => {
                match outgoing {
                    Some(message) => {
                        let is_terminal = matches!(message, ServerMessage::GameEnded { .. });
                        let send_result = send_message(&mut sink, &message).await;
                        if is_terminal {
                            // The session has reached a terminal state and
                            // notified both clients; remove it from the
                            // registry now (spec.md §4.5 "on terminal") so
                            // terminated sessions don't leak forever.
                            state.registry.remove(session.game_id);
                        }
                        if send_result.is_err() || is_terminal {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    session.disconnect(player_id);
    let _ = sink.close().await;
}

type Sink = futures_util::stream::SplitSink<WebSocket, Message>;
type Stream = futures_util::stream::SplitStream<WebSocket>;

async fn send_message(sink: &mut Sink, message: &ServerMessage) -> Result<(), axum::Error> {
    let text = serde_json::to_string(message).expect("ServerMessage always serializes");
    sink.send(Message::Text(text.into())).await
}

type OutboxRx = tokio::sync::mpsc::UnboundedReceiver<ServerMessage>;

/// Steps 1-5 of spec.md §4.6: read `login`, fetch and validate the
/// challenge (looping on failure so the client can retry), bind to a
/// session, and send `game_info`. Returns `None` if the socket closed
/// before authentication completed.
async fn authenticate(
    sink: &mut Sink,
    stream: &mut Stream,
    state: &AppState,
) -> Option<(SessionHandle, PlayerId, OutboxRx)> {
    loop {
        let text = match stream.next().await? {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => return None,
            _ => continue,
        };

        let login = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Login { game_id, username }) => (game_id, username),
            Ok(_) => {
                let _ = send_message(sink, &ServerMessage::Error { reason: "expected login".to_string() }).await;
                continue;
            }
            Err(err) => {
                let err = crate::error::ServerError::ProtocolViolation(err.to_string());
                let _ = send_message(sink, &ServerMessage::Error { reason: err.to_string() }).await;
                continue;
            }
        };
        let (game_id_raw, username) = login;

        let Ok(game_id) = Uuid::parse_str(&game_id_raw) else {
            let _ = send_message(sink, &ServerMessage::LoginResult { ok: false, error: Some("malformed game id".to_string()) }).await;
            continue;
        };

        let challenge = match state.registry.app_service().fetch_challenge(game_id).await {
            Ok(c) => c,
            Err(err) => {
                let _ = send_message(sink, &ServerMessage::LoginResult { ok: false, error: Some(err.to_string()) }).await;
                continue;
            }
        };

        if challenge.participant(&username).is_none() {
            let err = crate::error::ServerError::NotAParticipant { game_id, username: username.clone() };
            let _ = send_message(sink, &ServerMessage::LoginResult { ok: false, error: Some(err.to_string()) }).await;
            continue;
        }

        let session = state.registry.get_or_create(game_id).await;
        let player_id = PlayerId(Uuid::new_v4());
        let (outbox_tx, mut outbox_rx) = tokio::sync::mpsc::unbounded_channel();

        let color = match session.bind_player(player_id, username.clone(), outbox_tx).await {
            Ok(color) => color,
            Err(err) => {
                let _ = send_message(sink, &ServerMessage::LoginResult { ok: false, error: Some(err.to_string()) }).await;
                return None;
            }
        };

        let _ = send_message(sink, &ServerMessage::LoginResult { ok: true, error: None }).await;

        let self_info = challenge.participant(&username).expect("checked above");
        let opponent_info = challenge.opponent_of(&username).expect("two-participant challenge");
        let projection: ProjectedElo = elo::project(self_info.elo, opponent_info.elo).into();
        let _ = send_message(
            sink,
            &ServerMessage::GameInfo {
                self_username: username,
                self_elo: self_info.elo,
                self_projected_elo: projection,
                opponent_username: opponent_info.username.clone(),
                opponent_elo: opponent_info.elo,
                self_is_white: crate::protocol::is_white(color),
            },
        )
        .await;

        // Drain any messages already queued (e.g. the `game_state` pushed
        // synchronously by the second bind) before handing control to the
        // combined read/write loop in `handle_socket`.
        while let Ok(message) = outbox_rx.try_recv() {
            if send_message(sink, &message).await.is_err() {
                return None;
            }
        }

        return Some((session, player_id, outbox_rx));
    }
}

async fn handle_client_message(session: &SessionHandle, player_id: PlayerId, text: &str, sink: &mut Sink) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::Move { from, to }) => match (Square::from_notation(&from), Square::from_notation(&to)) {
            (Some(from), Some(to)) => session.submit_move(player_id, from, to),
            _ => {
                let _ = send_message(sink, &ServerMessage::MoveRejected { reason: "malformed square notation".to_string() }).await;
            }
        },
        Ok(ClientMessage::OfferDraw) => session.offer_draw(player_id),
        Ok(ClientMessage::AcceptDraw) => session.respond_draw(player_id, true),
        Ok(ClientMessage::DeclineDraw) => session.respond_draw(player_id, false),
        Ok(ClientMessage::Resign) => session.resign(player_id),
        Ok(ClientMessage::Login { .. }) => {
            let _ = send_message(sink, &ServerMessage::Error { reason: "already logged in".to_string() }).await;
        }
        Err(err) => {
            let err = crate::error::ServerError::ProtocolViolation(err.to_string());
            let _ = send_message(sink, &ServerMessage::Error { reason: err.to_string() }).await;
        }
    }
}
