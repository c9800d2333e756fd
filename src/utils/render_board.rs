//! Terminal-oriented Unicode board renderer.
//!
//! Creates a human-readable board view for debugging, tests, and log output.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::square::Square;

/// Render the board to a Unicode string for terminal output.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            let code = Square { file, rank }.code();
            match board.piece_at(code) {
                Some(found) => {
                    let kind = board
                        .slot_kind(found.side, found.slot)
                        .expect("occupied slot must resolve to a kind");
                    out.push(piece_to_unicode(found.side, kind));
                }
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

fn piece_to_unicode(side: Color, kind: PieceKind) -> char {
    match (side, kind) {
        (Color::White, PieceKind::Pawn) => '♙',
        (Color::White, PieceKind::Knight) => '♘',
        (Color::White, PieceKind::Bishop) => '♗',
        (Color::White, PieceKind::Rook) => '♖',
        (Color::White, PieceKind::Queen) => '♕',
        (Color::White, PieceKind::King) => '♔',
        (Color::Black, PieceKind::Pawn) => '♟',
        (Color::Black, PieceKind::Knight) => '♞',
        (Color::Black, PieceKind::Bishop) => '♝',
        (Color::Black, PieceKind::Rook) => '♜',
        (Color::Black, PieceKind::Queen) => '♛',
        (Color::Black, PieceKind::King) => '♚',
    }
}

#[cfg(test)]
mod tests {
    use super::render_board;
    use crate::game_state::board::Board;

    #[test]
    fn start_position_renders_all_pieces() {
        let board = Board::new_game();
        let rendered = render_board(&board);
        assert_eq!(rendered.matches('♙').count(), 8);
        assert_eq!(rendered.matches('♟').count(), 8);
        assert_eq!(rendered.matches('♔').count(), 1);
        assert_eq!(rendered.matches('♚').count(), 1);
        assert!(rendered.starts_with("  a b c d e f g h"));
    }
}
