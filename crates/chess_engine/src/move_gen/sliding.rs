//! Shared stepping logic for sliding pieces (rook, bishop, queen).

use crate::board::Board;
use crate::types::Square;

pub const ROOK_STEPS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_STEPS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const QUEEN_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
];

/// Step outward along each direction, adding empty squares; stop (after including) on
/// the first enemy piece, stop (without including) on the first friendly piece.
pub fn slide(board: &Board, from: Square, steps: &[(i8, i8)]) -> Vec<Square> {
    let mover = board.piece_at(from).expect("slide called on empty square").color;
    let mut moves = Vec::new();
    for &(df, dr) in steps {
        let mut range = 1i8;
        loop {
            let Some(target) = from.offset(df * range, dr * range) else {
                break;
            };
            match board.piece_at(target) {
                None => {
                    moves.push(target);
                    range += 1;
                }
                Some(occupant) if occupant.color != mover => {
                    moves.push(target);
                    break;
                }
                Some(_) => break,
            }
        }
    }
    moves
}

/// Single-step (non-repeating) offsets, used by knight and king.
pub fn jump(board: &Board, from: Square, steps: &[(i8, i8)]) -> Vec<Square> {
    let mover = board.piece_at(from).expect("jump called on empty square").color;
    steps
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&target| match board.piece_at(target) {
            None => true,
            Some(occupant) => occupant.color != mover,
        })
        .collect()
}
