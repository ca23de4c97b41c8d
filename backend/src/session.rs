//! The Game Session: one dedicated task per live game, owning the
//! [`chess_engine::Board`] and serializing every command from both players
//! onto a single state machine (spec.md §4.4, §5). All reads and mutations
//! of session state happen inside this task; `SessionHandle` is the only
//! thing other tasks touch, and it only ever sends commands down an mpsc
//! queue; no lock is taken on the board or the session fields themselves.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use chess_engine::{Color, GameStatus, Square};

use crate::app_service::AppService;
use crate::board_view;
use crate::error::{ServerError, ServerResult};
use crate::protocol::ServerMessage;

/// Identifies a bound transport to the session. The connection handler
/// mints one per accepted connection; ownership checks compare this, not
/// the channel itself (channels aren't `Eq`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub Uuid);

pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    CheckmateWin { winner: Color },
    DrawByAgreement,
    DrawByRule { reason: &'static str },
    Resignation { winner: Color },
    Aborted,
}

impl Terminal {
    fn description(&self) -> String {
        match self {
            Terminal::CheckmateWin { .. } => "checkmate".to_string(),
            Terminal::DrawByAgreement => "draw by agreement".to_string(),
            Terminal::DrawByRule { reason } => format!("draw: {reason}"),
            Terminal::Resignation { .. } => "resignation".to_string(),
            Terminal::Aborted => "aborted: both players disconnected".to_string(),
        }
    }

    fn winner_username(&self, white: &str, black: &str) -> Option<String> {
        match self {
            Terminal::CheckmateWin { winner } | Terminal::Resignation { winner } => Some(match winner {
                Color::White => white.to_string(),
                Color::Black => black.to_string(),
            }),
            _ => None,
        }
    }
}

struct PlayerSlot {
    id: PlayerId,
    username: String,
    outbox: Outbox,
}

enum Command {
    Bind {
        id: PlayerId,
        username: String,
        outbox: Outbox,
        reply: oneshot::Sender<ServerResult<Color>>,
    },
    SubmitMove {
        id: PlayerId,
        from: Square,
        to: Square,
    },
    OfferDraw {
        id: PlayerId,
    },
    RespondDraw {
        id: PlayerId,
        accept: bool,
    },
    Resign {
        id: PlayerId,
    },
    ViewerBoard {
        id: PlayerId,
        reply: oneshot::Sender<ServerResult<String>>,
    },
    Disconnect {
        id: PlayerId,
    },
}

/// Cloneable front for a running session task. Every method either enqueues
/// a fire-and-forget command (responses are pushed to the relevant
/// player's `Outbox` from inside the task) or awaits a reply for the
/// handful of operations the connection handler needs synchronously.
#[derive(Clone)]
pub struct SessionHandle {
    pub game_id: Uuid,
    commands: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub fn spawn(game_id: Uuid, app_service: Arc<dyn AppService>) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = SessionActor::new(game_id, app_service, rx);
        tokio::spawn(actor.run());
        SessionHandle { game_id, commands: tx }
    }

    pub async fn bind_player(&self, id: PlayerId, username: String, outbox: Outbox) -> ServerResult<Color> {
        let (reply, rx) = oneshot::channel();
        let _ = self.commands.send(Command::Bind { id, username, outbox, reply });
        rx.await.map_err(|_| ServerError::AlreadyTerminal(self.game_id))?
    }

    pub fn submit_move(&self, id: PlayerId, from: Square, to: Square) {
        let _ = self.commands.send(Command::SubmitMove { id, from, to });
    }

    pub fn offer_draw(&self, id: PlayerId) {
        let _ = self.commands.send(Command::OfferDraw { id });
    }

    pub fn respond_draw(&self, id: PlayerId, accept: bool) {
        let _ = self.commands.send(Command::RespondDraw { id, accept });
    }

    pub fn resign(&self, id: PlayerId) {
        let _ = self.commands.send(Command::Resign { id });
    }

    pub async fn viewer_board(&self, id: PlayerId) -> ServerResult<String> {
        let (reply, rx) = oneshot::channel();
        let _ = self.commands.send(Command::ViewerBoard { id, reply });
        rx.await.map_err(|_| ServerError::AlreadyTerminal(self.game_id))?
    }

    pub fn disconnect(&self, id: PlayerId) {
        let _ = self.commands.send(Command::Disconnect { id });
    }
}

/// Owns all mutable session state; lives entirely inside `run`'s task.
struct SessionActor {
    game_id: Uuid,
    app_service: Arc<dyn AppService>,
    commands: mpsc::UnboundedReceiver<Command>,
    board: chess_engine::Board,
    white: Option<PlayerSlot>,
    black: Option<PlayerSlot>,
    terminal: Option<Terminal>,
    draw_offer: Option<Color>,
}

impl SessionActor {
    fn new(game_id: Uuid, app_service: Arc<dyn AppService>, commands: mpsc::UnboundedReceiver<Command>) -> SessionActor {
        SessionActor {
            game_id,
            app_service,
            commands,
            board: chess_engine::Board::new(),
            white: None,
            black: None,
            terminal: None,
            draw_offer: None,
        }
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            if self.terminal.is_some() {
                // Terminal sessions ignore further commands (spec.md §4.4);
                // bind/viewer_board replies still need an answer so callers
                // don't hang on a dropped oneshot.
                match command {
                    Command::Bind { reply, .. } => {
                        let _ = reply.send(Err(ServerError::AlreadyTerminal(self.game_id)));
                    }
                    Command::ViewerBoard { reply, .. } => {
                        let _ = reply.send(Err(ServerError::AlreadyTerminal(self.game_id)));
                    }
                    _ => {}
                }
                continue;
            }

            match command {
                Command::Bind { id, username, outbox, reply } => {
                    let result = self.handle_bind(id, username, outbox);
                    let _ = reply.send(result);
                }
                Command::SubmitMove { id, from, to } => self.handle_submit_move(id, from, to).await,
                Command::OfferDraw { id } => self.handle_offer_draw(id),
                Command::RespondDraw { id, accept } => self.handle_respond_draw(id, accept).await,
                Command::Resign { id } => self.handle_resign(id).await,
                Command::ViewerBoard { id, reply } => {
                    let result = self.color_of(id).map(|color| board_view::render(&self.board, color));
                    let _ = reply.send(result);
                }
                Command::Disconnect { id } => self.handle_disconnect(id).await,
            }

            if self.terminal.is_some() {
                self.finish().await;
            }
        }
    }

    fn color_of(&self, id: PlayerId) -> ServerResult<Color> {
        if self.white.as_ref().is_some_and(|p| p.id == id) {
            Ok(Color::White)
        } else if self.black.as_ref().is_some_and(|p| p.id == id) {
            Ok(Color::Black)
        } else {
            Err(ServerError::NotBound)
        }
    }

    fn slot(&self, color: Color) -> Option<&PlayerSlot> {
        match color {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    fn send_to(&self, color: Color, message: ServerMessage) {
        if let Some(slot) = self.slot(color) {
            let _ = slot.outbox.send(message);
        }
    }

    fn handle_bind(&mut self, id: PlayerId, username: String, outbox: Outbox) -> ServerResult<Color> {
        if self.white.is_none() {
            self.white = Some(PlayerSlot { id, username, outbox });
            Ok(Color::White)
        } else if self.black.is_none() {
            self.black = Some(PlayerSlot { id, username, outbox });
            // Second bind completes the pairing: notify both sides (spec.md
            // §4.4 "InProgress ... both transports notified").
            self.send_to(Color::White, ServerMessage::GameState { board: board_view::render(&self.board, Color::White) });
            self.send_to(Color::Black, ServerMessage::GameState { board: board_view::render(&self.board, Color::Black) });
            Ok(Color::Black)
        } else {
            Err(ServerError::SessionFull(self.game_id))
        }
    }

    async fn handle_submit_move(&mut self, id: PlayerId, from: Square, to: Square) {
        // An id that doesn't resolve to a bound color can only reach here
        // through a connection-handler bug: the handler only forwards
        // moves for a transport it already bound. There's no outbox to
        // notify, so the command is simply dropped.
        let Ok(color) = self.color_of(id) else {
            return;
        };

        // The engine only checks the moved piece's own color against the
        // side to move, not which player submitted it: without this check
        // a bound player could move their opponent's pieces on the
        // opponent's turn (spec.md §4.4 "validates it is that player's turn").
        if color != self.board.side_to_move() {
            self.send_to(color, ServerMessage::MoveRejected { reason: "it is not your turn".to_string() });
            return;
        }

        match chess_engine::submit_move(&mut self.board, from, to) {
            Ok(status) => {
                self.draw_offer = None;
                self.send_to(color, ServerMessage::MoveConfirmed);
                self.send_to(color, ServerMessage::GameState { board: board_view::render(&self.board, color) });
                let opponent = color.opposite();
                self.send_to(opponent, ServerMessage::GameState { board: board_view::render(&self.board, opponent) });

                if let Some(terminal) = Self::terminal_for(status, color) {
                    self.terminal = Some(terminal);
                }
            }
            Err(err) => {
                self.send_to(color, ServerMessage::MoveRejected { reason: err.to_string() });
            }
        }
    }

    fn terminal_for(status: GameStatus, mover: Color) -> Option<Terminal> {
        match status {
            GameStatus::Checkmate => Some(Terminal::CheckmateWin { winner: mover }),
            GameStatus::Stalemate => Some(Terminal::DrawByRule { reason: "stalemate" }),
            GameStatus::DrawByRepetition => Some(Terminal::DrawByRule { reason: "threefold repetition" }),
            GameStatus::DrawByFiftyMoveRule => Some(Terminal::DrawByRule { reason: "fifty-move rule" }),
            GameStatus::InProgress | GameStatus::Check => None,
        }
    }

    fn handle_offer_draw(&mut self, id: PlayerId) {
        let Ok(color) = self.color_of(id) else {
            return;
        };
        // A second offer silently overrides the first (spec.md §4.4).
        self.draw_offer = Some(color);
        self.send_to(color.opposite(), ServerMessage::DrawOffered);
    }

    async fn handle_respond_draw(&mut self, id: PlayerId, accept: bool) {
        let Ok(responder) = self.color_of(id) else {
            return;
        };
        let Some(offerer) = self.draw_offer else {
            return;
        };
        if offerer == responder {
            // A player cannot accept/decline their own outstanding offer.
            return;
        }
        self.draw_offer = None;
        if accept {
            self.send_to(offerer, ServerMessage::DrawAccepted);
            self.send_to(responder, ServerMessage::DrawAccepted);
            self.terminal = Some(Terminal::DrawByAgreement);
        } else {
            self.send_to(offerer, ServerMessage::DrawDeclined);
        }
    }

    async fn handle_resign(&mut self, id: PlayerId) {
        let Ok(color) = self.color_of(id) else {
            return;
        };
        self.terminal = Some(Terminal::Resignation { winner: color.opposite() });
    }

    /// A dropped transport is resignation of that color (spec.md §5). If
    /// both have already gone, or the disconnecting side was never bound,
    /// this becomes Aborted instead so no false winner is reported.
    async fn handle_disconnect(&mut self, id: PlayerId) {
        let Ok(color) = self.color_of(id) else {
            return;
        };
        let opponent_still_present = self.slot(color.opposite()).is_some();
        self.terminal = Some(if opponent_still_present {
            Terminal::Resignation { winner: color.opposite() }
        } else {
            Terminal::Aborted
        });
    }

    /// Posts the result to the External App Service (bounded retry lives in
    /// the adapter itself) and notifies both clients, regardless of whether
    /// the post succeeded. spec.md §4.4: "the result is still authoritative
    /// locally ... must not be withheld from the clients by upstream failure."
    async fn finish(&mut self) {
        let Some(terminal) = self.terminal.clone() else { return };
        if matches!(terminal, Terminal::Aborted) {
            tracing::info!(game_id = %self.game_id, "session aborted: both players disconnected");
            return;
        }

        let (white_name, black_name) = (
            self.white.as_ref().map(|p| p.username.clone()).unwrap_or_default(),
            self.black.as_ref().map(|p| p.username.clone()).unwrap_or_default(),
        );
        let winner_username = terminal.winner_username(&white_name, &black_name);

        if let Err(err) = self.app_service.post_result(self.game_id, winner_username.as_deref()).await {
            tracing::error!(game_id = %self.game_id, error = %err, "app-service result post failed after retries; proceeding to notify clients");
        }

        let description = terminal.description();
        for color in [Color::White, Color::Black] {
            self.send_to(
                color,
                ServerMessage::GameEnded {
                    winner_username: winner_username.clone(),
                    description: description.clone(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_service::mock::MockAppService;
    use crate::app_service::{Challenge, ChallengeUser};

    fn mock_service() -> Arc<dyn AppService> {
        Arc::new(MockAppService::with_challenge(
            Uuid::nil(),
            Challenge {
                from_user: ChallengeUser { username: "alice".to_string(), elo: 1500.0 },
                to_user: ChallengeUser { username: "bob".to_string(), elo: 1400.0 },
            },
        ))
    }

    async fn bind_both(handle: &SessionHandle) -> (PlayerId, mpsc::UnboundedReceiver<ServerMessage>, PlayerId, mpsc::UnboundedReceiver<ServerMessage>) {
        let white_id = PlayerId(Uuid::new_v4());
        let black_id = PlayerId(Uuid::new_v4());
        let (white_tx, white_rx) = mpsc::unbounded_channel();
        let (black_tx, black_rx) = mpsc::unbounded_channel();
        assert_eq!(handle.bind_player(white_id, "alice".to_string(), white_tx).await.unwrap(), Color::White);
        assert_eq!(handle.bind_player(black_id, "bob".to_string(), black_tx).await.unwrap(), Color::Black);
        (white_id, white_rx, black_id, black_rx)
    }

    #[tokio::test]
    async fn third_bind_attempt_is_rejected() {
        let handle = SessionHandle::spawn(Uuid::nil(), mock_service());
        let (_w, _wr, _b, _br) = bind_both(&handle).await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = handle.bind_player(PlayerId(Uuid::new_v4()), "eve".to_string(), tx).await.unwrap_err();
        assert!(matches!(err, ServerError::SessionFull(_)));
    }

    #[tokio::test]
    async fn fools_mate_reaches_checkmate_and_notifies_both_sides() {
        let handle = SessionHandle::spawn(Uuid::nil(), mock_service());
        let (white_id, mut white_rx, black_id, mut black_rx) = bind_both(&handle).await;

        for (mover, from, to) in [
            (white_id, "f2", "f3"),
            (black_id, "e7", "e5"),
            (white_id, "g2", "g4"),
            (black_id, "d8", "h4"),
        ] {
            handle.submit_move(mover, Square::from_notation(from).unwrap(), Square::from_notation(to).unwrap());
        }

        let white_ended = recv_game_ended(&mut white_rx).await;
        let black_ended = recv_game_ended(&mut black_rx).await;
        assert_eq!(white_ended, Some("bob".to_string()));
        assert_eq!(black_ended, Some("bob".to_string()));
    }

    #[tokio::test]
    async fn illegal_move_is_rejected_without_advancing_turn() {
        let handle = SessionHandle::spawn(Uuid::nil(), mock_service());
        let (white_id, mut white_rx, _black_id, _black_rx) = bind_both(&handle).await;

        handle.submit_move(white_id, Square::from_notation("e2").unwrap(), Square::from_notation("e5").unwrap());

        let mut saw_rejection = false;
        for _ in 0..10 {
            match white_rx.recv().await {
                Some(ServerMessage::MoveRejected { .. }) => {
                    saw_rejection = true;
                    break;
                }
                Some(_) => continue,
                None => break,
            }
        }
        assert!(saw_rejection);
    }

    #[tokio::test]
    async fn viewer_board_from_an_unbound_transport_is_rejected() {
        let handle = SessionHandle::spawn(Uuid::nil(), mock_service());
        let (_w, _wr, _b, _br) = bind_both(&handle).await;

        let err = handle.viewer_board(PlayerId(Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, ServerError::NotBound));
    }

    #[tokio::test]
    async fn resignation_reports_the_opponent_as_winner() {
        let handle = SessionHandle::spawn(Uuid::nil(), mock_service());
        let (white_id, mut white_rx, _black_id, mut black_rx) = bind_both(&handle).await;

        handle.resign(white_id);

        assert_eq!(recv_game_ended(&mut white_rx).await, Some("bob".to_string()));
        assert_eq!(recv_game_ended(&mut black_rx).await, Some("bob".to_string()));
    }

    async fn recv_game_ended(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Option<String> {
        loop {
            match rx.recv().await? {
                ServerMessage::GameEnded { winner_username, .. } => return winner_username,
                _ => continue,
            }
        }
    }
}
