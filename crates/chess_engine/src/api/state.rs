//! Terminal-state detection: check, checkmate, stalemate and the two draw
//! conditions the engine is responsible for recognizing.

use crate::api::moves;
use crate::board::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate,
    Stalemate,
    DrawByRepetition,
    DrawByFiftyMoveRule,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress | GameStatus::Check)
    }
}

/// Evaluates the status of the side to move. Checkmate/stalemate take
/// priority over the two draw conditions: a side with no legal move is mated
/// or stalemated regardless of how many times the position has repeated.
pub fn status(board: &Board) -> GameStatus {
    let side = board.side_to_move();
    let in_check = board.is_check(side);

    let has_legal_move = board
        .pieces_of(side)
        .any(|(square, _)| !moves::legal_destinations(board, square).is_empty());

    if !has_legal_move {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }

    if board.current_repetition_count() >= 3 {
        return GameStatus::DrawByRepetition;
    }

    // Fifty full moves without a pawn move or capture is a hundred half-moves.
    if board.fifty_move_count() >= 100 {
        return GameStatus::DrawByFiftyMoveRule;
    }

    if in_check {
        GameStatus::Check
    } else {
        GameStatus::InProgress
    }
}
