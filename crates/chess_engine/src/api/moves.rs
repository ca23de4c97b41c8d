//! Legal-move filtering and castling eligibility.

use crate::board::Board;
use crate::move_gen;
use crate::types::{Color, PieceKind, Square};

/// Every square `from`'s occupant may legally move to: its pseudo-legal
/// destinations minus any that would leave its own King in check, plus
/// castling destinations when `from` holds a King.
pub fn legal_destinations(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let color = piece.color;
    let kind = piece.kind;

    let mut destinations: Vec<Square> = move_gen::pseudo_legal(board, from)
        .into_iter()
        .filter(|&to| !leaves_own_king_in_check(board, from, to, color))
        .collect();

    if kind == PieceKind::King {
        destinations.extend(castling_destinations(board, color));
    }

    destinations
}

pub fn is_legal(board: &Board, from: Square, to: Square) -> bool {
    legal_destinations(board, from).contains(&to)
}

/// Simulates the candidate move on a cloned board and checks whether the
/// mover's own King ends up attacked. Every candidate is checked this way,
/// including King moves themselves, so a King can never step into check.
fn leaves_own_king_in_check(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let mut probe = board.clone();
    probe.apply_move(from, to);
    probe.is_check(color)
}

/// The King-side and/or Queen-side castling destination squares available to
/// `color` right now. Empty if castling is unavailable for any reason.
pub fn castling_destinations(board: &Board, color: Color) -> Vec<Square> {
    let mut destinations = Vec::new();

    let king_square = board.king_square(color);
    let Some(king) = board.piece_at(king_square) else {
        return destinations;
    };
    if king.last_move.is_some() {
        return destinations;
    }
    if board.is_check(color) {
        return destinations;
    }

    let rank = color.back_rank();

    // King-side: Rook on the h-file, King passes through f and lands on g.
    if rook_is_eligible(board, color, rank, 7)
        && squares_empty(board, rank, &[5, 6])
        && squares_unattacked(board, color, rank, &[5, 6])
    {
        destinations.push(Square::new(6, rank).unwrap());
    }

    // Queen-side: Rook on the a-file, King passes through d and lands on c.
    // b must be empty too (the Knight's home square) even though the King
    // never passes over it.
    if rook_is_eligible(board, color, rank, 0)
        && squares_empty(board, rank, &[1, 2, 3])
        && squares_unattacked(board, color, rank, &[2, 3])
    {
        destinations.push(Square::new(2, rank).unwrap());
    }

    destinations
}

fn rook_is_eligible(board: &Board, color: Color, rank: i8, file: i8) -> bool {
    match board.piece_at(Square::new(file, rank).unwrap()) {
        Some(rook) => rook.kind == PieceKind::Rook && rook.color == color && rook.last_move.is_none(),
        None => false,
    }
}

fn squares_empty(board: &Board, rank: i8, files: &[i8]) -> bool {
    files.iter().all(|&file| board.is_empty(Square::new(file, rank).unwrap()))
}

fn squares_unattacked(board: &Board, color: Color, rank: i8, files: &[i8]) -> bool {
    files
        .iter()
        .all(|&file| !board.is_square_attacked(Square::new(file, rank).unwrap(), color.opposite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    #[test]
    fn king_cannot_step_next_to_a_pin_that_exposes_check() {
        let board = Board::new();
        // In the starting position the King has no legal moves at all: every
        // adjacent square is either occupied by a friendly piece or off-board.
        let king_square = board.king_square(Color::White);
        assert!(legal_destinations(&board, king_square).is_empty());
    }

    #[test]
    fn castling_unavailable_before_clearing_the_back_rank() {
        let board = Board::new();
        assert!(castling_destinations(&board, Color::White).is_empty());
    }

    #[test]
    fn castling_available_once_path_is_clear_and_safe() {
        let mut board = Board::new();
        for (from, to) in [
            ("g1", "f3"),
            ("g8", "f6"),
            ("g2", "g3"),
            ("g7", "g6"),
            ("f1", "g2"),
            ("f8", "g7"),
        ] {
            board.apply_move(Square::from_notation(from).unwrap(), Square::from_notation(to).unwrap());
        }
        let destinations = castling_destinations(&board, Color::White);
        assert_eq!(destinations, vec![Square::from_notation("g1").unwrap()]);
    }
}
