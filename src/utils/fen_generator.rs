//! Board-to-descriptor rendering.
//!
//! Produces the six-field descriptor with empty squares collapsed into digit
//! runs. The clock fields echo whatever the board currently stores.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::square::{Square, NO_SQUARE};

pub fn generate_fen(board: &Board) -> String {
    let mut out = String::with_capacity(90);

    for rank in (0..8u8).rev() {
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let code = Square { file, rank }.code();
            match piece_char_at(board, code) {
                Some(ch) => {
                    if empty_run > 0 {
                        out.push(char::from(b'0' + empty_run));
                        empty_run = 0;
                    }
                    out.push(ch);
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            out.push(char::from(b'0' + empty_run));
        }
        if rank > 0 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(board.side_to_move.letter());

    out.push(' ');
    out.push_str(&castling_field(board.castling_rights));

    out.push(' ');
    if board.en_passant == NO_SQUARE {
        out.push('-');
    } else {
        out.push_str(&Square::from_code(board.en_passant).to_algebraic());
    }

    out.push_str(&format!(
        " {} {}",
        board.halfmove_clock, board.fullmove_number
    ));

    out
}

fn piece_char_at(board: &Board, code: u8) -> Option<char> {
    let found = board.piece_at(code)?;
    let kind = board
        .slot_kind(found.side, found.slot)
        .expect("occupied slot must resolve to a kind");
    let letter = kind.letter();
    Some(match found.side {
        Color::White => letter.to_ascii_uppercase(),
        Color::Black => letter,
    })
}

fn castling_field(rights: CastlingRights) -> String {
    if rights == 0 {
        return "-".to_owned();
    }
    let mut field = String::with_capacity(4);
    if rights & CASTLE_WHITE_KINGSIDE != 0 {
        field.push('K');
    }
    if rights & CASTLE_WHITE_QUEENSIDE != 0 {
        field.push('Q');
    }
    if rights & CASTLE_BLACK_KINGSIDE != 0 {
        field.push('k');
    }
    if rights & CASTLE_BLACK_QUEENSIDE != 0 {
        field.push('q');
    }
    field
}
