use super::sliding::{jump, KNIGHT_STEPS};
use crate::board::Board;
use crate::types::Square;

/// Pseudo-legal destinations for a Knight on `from`.
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    jump(board, from, &KNIGHT_STEPS)
}
