//! Crate-boundary error type for everything above the rules engine:
//! session/registry failures, transport-ownership failures and app-service
//! upstream failures. Mirrors `chess_engine::error::ChessError`'s shape:
//! one `thiserror`-derived enum per boundary rather than `anyhow` throughout.

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("malformed message: {0}")]
    ProtocolViolation(String),

    #[error("no challenge found for game {0}")]
    UnknownGame(Uuid),

    #[error("username {username} is not a participant in game {game_id}")]
    NotAParticipant { game_id: Uuid, username: String },

    #[error("game {0} already has two bound players")]
    SessionFull(Uuid),

    #[error("move rejected: {0}")]
    IllegalMove(#[from] chess_engine::ChessError),

    #[error("message from a transport not bound to this session")]
    NotBound,

    #[error("the app service is unreachable: {0}")]
    AppServiceUnreachable(#[from] reqwest::Error),

    #[error("the app service returned a malformed response: {0}")]
    AppServiceMalformed(String),

    #[error("session {0} has already reached a terminal state")]
    AlreadyTerminal(Uuid),
}

pub type ServerResult<T> = Result<T, ServerError>;
