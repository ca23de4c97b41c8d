//! The client-facing wire protocol: JSON objects over WebSocket text frames,
//! one message per frame, each tagged with a `"type"` field (spec.md §6).
//! This module is the single source of truth for the encoding; message
//! translation in [`crate::connection`] is purely mechanical against these
//! types, matching spec.md's "no chess logic here".

use serde::{Deserialize, Serialize};

use chess_engine::Color;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Login { game_id: String, username: String },
    Move { from: String, to: String },
    OfferDraw,
    AcceptDraw,
    DeclineDraw,
    Resign,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LoginResult { ok: bool, error: Option<String> },
    GameInfo {
        self_username: String,
        self_elo: f64,
        self_projected_elo: ProjectedElo,
        opponent_username: String,
        opponent_elo: f64,
        self_is_white: bool,
    },
    GameState { board: String },
    MoveConfirmed,
    MoveRejected { reason: String },
    DrawOffered,
    DrawAccepted,
    DrawDeclined,
    GameEnded { winner_username: Option<String>, description: String },
    Error { reason: String },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectedElo {
    pub win: f64,
    pub draw: f64,
    pub lose: f64,
}

impl From<crate::elo::EloProjection> for ProjectedElo {
    fn from(p: crate::elo::EloProjection) -> ProjectedElo {
        ProjectedElo { win: p.win, draw: p.draw, lose: p.lose }
    }
}

/// `chess_engine::Color` isn't `Serialize`; the wire protocol only ever
/// exposes it as `self_is_white`, so the mapping lives here rather than on
/// the engine type.
pub fn is_white(color: Color) -> bool {
    matches!(color, Color::White)
}
