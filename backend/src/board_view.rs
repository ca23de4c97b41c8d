//! Textual rendering of a [`chess_engine::Board`], oriented from a given
//! viewer's color (spec.md §4.4 `viewer_board`). The exact encoding is an
//! implementation choice per spec.md; this one is a deterministic 8x8 grid
//! of piece tokens with file/rank labels, reversible by inspection.

use chess_engine::{Board, Color, Square};

/// Renders `board` as seen by `viewer`: White reads bottom-to-top from rank
/// 1, Black's view is flipped so their own back rank is at the bottom.
pub fn render(board: &Board, viewer: Color) -> String {
    let ranks: Vec<i8> = match viewer {
        Color::White => (0..8).rev().collect(),
        Color::Black => (0..8).collect(),
    };
    let files: Vec<i8> = match viewer {
        Color::White => (0..8).collect(),
        Color::Black => (0..8).rev(),
    };

    let mut out = String::new();
    for &rank in &ranks {
        out.push_str(&format!("{} ", rank + 1));
        for &file in &files {
            let square = Square::new(file, rank).expect("file/rank in 0..8");
            let token = match board.piece_at(square) {
                Some(piece) => piece_glyph(piece.kind, piece.color),
                None => if (file + rank) % 2 == 0 { "." } else { "," },
            };
            out.push_str(token);
            out.push(' ');
        }
        out.push('\n');
    }

    out.push_str("  ");
    for &file in &files {
        out.push((b'a' + file as u8) as char);
        out.push(' ');
    }
    out.push('\n');
    out
}

fn piece_glyph(kind: chess_engine::PieceKind, color: Color) -> &'static str {
    use chess_engine::PieceKind::*;
    match (kind, color) {
        (Pawn, Color::White) => "P",
        (Knight, Color::White) => "N",
        (Bishop, Color::White) => "B",
        (Rook, Color::White) => "R",
        (Queen, Color::White) => "Q",
        (King, Color::White) => "K",
        (Pawn, Color::Black) => "p",
        (Knight, Color::Black) => "n",
        (Bishop, Color::Black) => "b",
        (Rook, Color::Black) => "r",
        (Queen, Color::Black) => "q",
        (King, Color::Black) => "k",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_view_has_white_back_rank_at_the_bottom() {
        let board = Board::new();
        let view = render(&board, Color::White);
        let last_line_before_files = view.lines().nth(7).unwrap();
        assert!(last_line_before_files.starts_with("1 R N B Q K B N R"));
    }

    #[test]
    fn black_view_is_the_mirror_of_white_view() {
        let board = Board::new();
        let white_view = render(&board, Color::White);
        let black_view = render(&board, Color::Black);
        assert_ne!(white_view, black_view);
        assert!(black_view.lines().nth(7).unwrap().starts_with("1 r n b k q b n r"));
    }
}
