//! Top-level move submission: validates the mover, the move's legality, and
//! applies it, returning the resulting game status.

use crate::api::moves;
use crate::api::state::{self, GameStatus};
use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::types::Square;

/// Validate and apply a move submitted by whichever side is to move.
///
/// On success the board has been mutated and the returned status reflects
/// the position *after* the move. On failure the board is left untouched.
pub fn submit_move(board: &mut Board, from: Square, to: Square) -> ChessResult<GameStatus> {
    let piece = board.piece_at(from).ok_or(ChessError::EmptySource(from))?;
    let side_to_move = board.side_to_move();
    if piece.color != side_to_move {
        return Err(ChessError::WrongColor {
            square: from,
            color: piece.color,
        });
    }
    if !moves::is_legal(board, from, to) {
        return Err(ChessError::IllegalMove { from, to });
    }

    board.apply_move(from, to);
    Ok(state::status(board))
}
