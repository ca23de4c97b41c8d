//! Error types for move validation and application.

use crate::types::Square;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    #[error("no piece on {0}")]
    EmptySource(Square),

    #[error("piece on {square} belongs to {color:?}, not the side to move")]
    WrongColor { square: Square, color: crate::types::Color },

    #[error("{from} to {to} is not a legal move")]
    IllegalMove { from: Square, to: Square },

    #[error("move would leave the {0:?} king in check")]
    LeavesKingInCheck(crate::types::Color),

    #[error("invalid square notation: {0}")]
    BadNotation(String),
}

pub type ChessResult<T> = Result<T, ChessError>;
