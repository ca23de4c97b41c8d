use super::sliding::{slide, ROOK_STEPS};
use crate::board::Board;
use crate::types::Square;

/// Pseudo-legal destinations for a Rook on `from`.
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    slide(board, from, &ROOK_STEPS)
}
