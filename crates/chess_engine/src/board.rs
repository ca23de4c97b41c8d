//! The 8x8 board model: piece placement, move ledger, repetition and
//! fifty-move bookkeeping, and the move-application primitive.

use std::collections::HashMap;

use crate::move_gen;
use crate::types::{Color, Piece, PieceKind, Square};

/// One recorded half-move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfMove {
    pub from: Square,
    pub to: Square,
    pub mover: Color,
    pub index: u32,
}

#[derive(Clone)]
pub struct Board {
    cells: [Option<Piece>; 64],
    move_ledger: Vec<HalfMove>,
    repetition: HashMap<String, u32>,
    fifty_move_count: u32,
    last_move_white: Option<(Square, Square)>,
    last_move_black: Option<(Square, Square)>,
}

impl Board {
    /// The standard opening position.
    pub fn new() -> Board {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut cells: [Option<Piece>; 64] = [const { None }; 64];
        for (color, back_rank, pawn_rank) in [
            (Color::White, Color::White.back_rank(), Color::White.pawn_start_rank()),
            (Color::Black, Color::Black.back_rank(), Color::Black.pawn_start_rank()),
        ] {
            for file in 0..8i8 {
                let back_sq = Square::new(file, back_rank).unwrap();
                cells[back_sq.index()] = Some(Piece::new(BACK_RANK[file as usize], color, back_sq));
                let pawn_sq = Square::new(file, pawn_rank).unwrap();
                cells[pawn_sq.index()] = Some(Piece::new(PieceKind::Pawn, color, pawn_sq));
            }
        }

        let mut board = Board {
            cells,
            move_ledger: Vec::new(),
            repetition: HashMap::new(),
            fifty_move_count: 0,
            last_move_white: None,
            last_move_black: None,
        };
        let signature = board.position_signature();
        board.repetition.insert(signature, 1);
        board
    }

    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.cells[square.index()].as_ref()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.cells[square.index()].is_none()
    }

    /// All live pieces of `color`, as (square, piece) pairs.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, &Piece)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| {
                cell.as_ref()
                    .filter(|piece| piece.color == color)
                    .map(|piece| (Square::from_index(index), piece))
            })
    }

    /// Square of `color`'s King. Panics if the invariant "exactly one King per
    /// color" has been violated, which would be an engine bug, not a user error.
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces_of(color)
            .find(|(_, piece)| piece.kind == PieceKind::King)
            .map(|(square, _)| square)
            .expect("invariant violated: no King on the board for this color")
    }

    /// `from, to` of the most recent move made by `color`, if any.
    pub fn last_move_by(&self, color: Color) -> Option<(Square, Square)> {
        match color {
            Color::White => self.last_move_white,
            Color::Black => self.last_move_black,
        }
    }

    /// Half-move index the *next* move will receive. Even => White to move,
    /// odd => Black to move.
    pub fn half_move_index(&self) -> u32 {
        self.move_ledger.len() as u32
    }

    pub fn side_to_move(&self) -> Color {
        if self.half_move_index() % 2 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn move_ledger(&self) -> &[HalfMove] {
        &self.move_ledger
    }

    pub fn fifty_move_count(&self) -> u32 {
        self.fifty_move_count
    }

    /// The sequence of (kind, color) tokens over the 64 squares, row-major,
    /// with empty squares distinguishable. Used as the repetition key.
    pub fn position_signature(&self) -> String {
        let mut signature = String::with_capacity(64 * 2);
        for cell in &self.cells {
            match cell {
                Some(piece) => signature.push_str(&piece.token()),
                None => signature.push_str("--"),
            }
        }
        signature
    }

    /// Number of times the current position has occurred, including now.
    pub fn current_repetition_count(&self) -> u32 {
        let signature = self.position_signature();
        *self.repetition.get(&signature).unwrap_or(&0)
    }

    /// True if any piece of `by_color` has `square` among its pseudo-legal
    /// destinations. The King's own pattern is included (two Kings may never
    /// stand adjacent), and none of the per-piece generators recurse into
    /// attack detection, so this cannot loop.
    pub fn is_square_attacked(&self, square: Square, by_color: Color) -> bool {
        self.pieces_of(by_color)
            .any(|(from, _)| move_gen::pseudo_legal(self, from).contains(&square))
    }

    pub fn is_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.opposite())
    }

    /// Move a piece without touching the ledger, repetition ledger, or
    /// fifty-move counter. Used internally for the Rook's half of castling,
    /// which shares the King's half-move index rather than getting its own.
    fn relocate(&mut self, from: Square, to: Square, half_move_index: u32) {
        let mut piece = self.cells[from.index()].take().expect("relocate: empty source");
        piece.square = Some(to);
        piece.last_move = Some(half_move_index);
        self.cells[to.index()] = Some(piece);
    }

    /// Apply an already-legal move, with all side effects: capture,
    /// en passant, castling rook relocation, promotion, ledger/repetition/
    /// fifty-move bookkeeping. Callers (the rules engine) are responsible for
    /// legality; this method performs no validation of its own.
    pub fn apply_move(&mut self, from: Square, to: Square) {
        let moving = self.cells[from.index()].clone().expect("apply_move: empty source");
        let color = moving.color;
        let half_move_index = self.move_ledger.len() as u32;
        let mut reset_fifty = moving.kind == PieceKind::Pawn;

        if let Some(captured) = self.cells[to.index()].take() {
            let _ = captured;
            reset_fifty = true;
        } else if moving.kind == PieceKind::Pawn && from.file != to.file {
            // Diagonal move onto an empty square: must be en passant.
            let alongside = Square::new(to.file, from.rank).expect("en passant alongside in bounds");
            self.cells[alongside.index()] = None;
            reset_fifty = true;
        }

        if moving.kind == PieceKind::King && moving.last_move.is_none() && (to.file - from.file).abs() == 2 {
            let rank = from.rank;
            if to.file == 2 {
                self.relocate(
                    Square::new(0, rank).unwrap(),
                    Square::new(3, rank).unwrap(),
                    half_move_index,
                );
            } else if to.file == 6 {
                self.relocate(
                    Square::new(7, rank).unwrap(),
                    Square::new(5, rank).unwrap(),
                    half_move_index,
                );
            }
        }

        let mut landed = moving;
        if landed.kind == PieceKind::Pawn && to.rank == color.promotion_rank() {
            landed.kind = PieceKind::Queen;
        }
        landed.square = Some(to);
        landed.last_move = Some(half_move_index);

        self.cells[to.index()] = Some(landed);
        self.cells[from.index()] = None;

        self.move_ledger.push(HalfMove {
            from,
            to,
            mover: color,
            index: half_move_index,
        });
        match color {
            Color::White => self.last_move_white = Some((from, to)),
            Color::Black => self.last_move_black = Some((from, to)),
        }

        let signature = self.position_signature();
        *self.repetition.entry(signature).or_insert(0) += 1;

        self.fifty_move_count = if reset_fifty { 0 } else { self.fifty_move_count + 1 };
    }
}

impl Default for Board {
    fn default() -> Board {
        Board::new()
    }
}
