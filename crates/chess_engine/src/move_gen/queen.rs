use super::sliding::{slide, QUEEN_STEPS};
use crate::board::Board;
use crate::types::Square;

/// Pseudo-legal destinations for a Queen on `from` (union of rook and bishop patterns).
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    slide(board, from, &QUEEN_STEPS)
}
