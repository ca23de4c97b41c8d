use super::sliding::{slide, BISHOP_STEPS};
use crate::board::Board;
use crate::types::Square;

/// Pseudo-legal destinations for a Bishop on `from`.
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    slide(board, from, &BISHOP_STEPS)
}
