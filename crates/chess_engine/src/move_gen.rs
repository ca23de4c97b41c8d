//! Pseudo-legal move generation, split one module per piece kind.
//!
//! Every generator returns reachable destination squares for the piece's
//! motion pattern, screened only for board occupancy and bounds, not yet
//! screened against leaving the mover's own King in check. That filtering
//! happens in [`crate::api::moves`].

pub mod bishop;
pub mod king;
pub mod knight;
pub mod pawn;
pub mod queen;
pub mod rook;
mod sliding;

use crate::board::Board;
use crate::types::{PieceKind, Square};

/// Dispatch to the generator matching the piece occupying `from`.
///
/// Panics if `from` is empty. Callers are expected to check occupancy first
/// (every call site in this crate iterates live pieces, which are by
/// definition occupied squares).
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    let kind = board
        .piece_at(from)
        .unwrap_or_else(|| panic!("pseudo_legal called on empty square {from}"))
        .kind;
    match kind {
        PieceKind::Pawn => pawn::pseudo_legal(board, from),
        PieceKind::Knight => knight::pseudo_legal(board, from),
        PieceKind::Bishop => bishop::pseudo_legal(board, from),
        PieceKind::Rook => rook::pseudo_legal(board, from),
        PieceKind::Queen => queen::pseudo_legal(board, from),
        PieceKind::King => king::pseudo_legal(board, from),
    }
}
