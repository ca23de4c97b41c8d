use crate::board::Board;
use crate::types::{PieceKind, Square};

/// Pseudo-legal destinations for a Pawn on `from`: forward pushes, diagonal
/// captures, and en passant.
pub fn pseudo_legal(board: &Board, from: Square) -> Vec<Square> {
    let piece = board.piece_at(from).expect("pawn move_gen called on empty square");
    let color = piece.color;
    let dir = color.forward();
    let mut moves = Vec::new();

    if let Some(one) = from.offset(0, dir) {
        if board.is_empty(one) {
            moves.push(one);
            if from.rank == color.pawn_start_rank() {
                if let Some(two) = from.offset(0, 2 * dir) {
                    if board.is_empty(two) {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for df in [-1i8, 1i8] {
        let Some(target) = from.offset(df, dir) else {
            continue;
        };
        if let Some(occupant) = board.piece_at(target) {
            if occupant.color != color {
                moves.push(target);
            }
            continue;
        }
        if is_en_passant_capture(board, from, target, color) {
            moves.push(target);
        }
    }

    moves
}

/// `target` is the empty diagonal square the pawn would land on. En passant is
/// legal iff the square alongside the capturing pawn (same file as `target`,
/// same rank as `from`) holds an enemy Pawn whose most recent move was a
/// two-square advance landing on that square.
fn is_en_passant_capture(board: &Board, from: Square, target: Square, color: crate::types::Color) -> bool {
    let Some(alongside) = Square::new(target.file, from.rank) else {
        return false;
    };
    let Some(alongside_piece) = board.piece_at(alongside) else {
        return false;
    };
    if alongside_piece.kind != PieceKind::Pawn || alongside_piece.color == color {
        return false;
    }
    let Some((last_from, last_to)) = board.last_move_by(color.opposite()) else {
        return false;
    };
    last_to == alongside && (last_from.rank - last_to.rank).abs() == 2
}
