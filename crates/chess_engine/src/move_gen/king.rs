use super::sliding::{jump, QUEEN_STEPS};
use crate::board::Board;
use crate::types::Square;

/// Pseudo-legal single-step destinations for a King on `from`.
///
/// Castling destinations are not included here: they depend on check and
/// attacked-square state that only the rules engine evaluates (see
/// `crate::api::moves::castling_destinations`), and including them here
/// would make this function unsuitable for attack detection (a king never
/// "attacks" a square by castling onto it).
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    jump(board, from, &QUEEN_STEPS)
}
