//! Position-descriptor parser.
//!
//! Builds a fully-populated `Board` from the six-field FEN-like descriptor.
//! Empty squares may be written either as a digit run or as consecutive `1`s;
//! both forms are accepted.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::square::{Square, SquareCode, NO_SQUARE};

pub fn parse_fen(fen: &str) -> Result<Board, String> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or("missing board layout in descriptor")?;
    let side_part = parts.next().ok_or("missing side-to-move in descriptor")?;
    let castling_part = parts.next().ok_or("missing castling rights in descriptor")?;
    let en_passant_part = parts.next().ok_or("missing en-passant square in descriptor")?;
    let halfmove_part = parts.next().ok_or("missing halfmove clock in descriptor")?;
    let fullmove_part = parts.next().ok_or("missing fullmove number in descriptor")?;

    if parts.next().is_some() {
        return Err("descriptor has extra trailing fields".to_owned());
    }

    let mut board = Board::new_empty();

    parse_board(board_part, &mut board)?;
    board.side_to_move = parse_side_to_move(side_part)?;
    board.castling_rights = parse_castling_rights(castling_part)?;
    board.en_passant = parse_en_passant_square(en_passant_part)?;
    board.halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| format!("invalid halfmove clock: {halfmove_part}"))?;
    board.fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| format!("invalid fullmove number: {fullmove_part}"))?;

    Ok(board)
}

fn parse_board(board_part: &str, board: &mut Board) -> Result<(), String> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err("board layout must contain 8 ranks".to_owned());
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - fen_rank_idx as u8;
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(format!("invalid empty-square count '{ch}'"));
                }
                file += empty_count as u8;
                continue;
            }

            let (side, kind) = piece_from_fen_char(ch)
                .ok_or_else(|| format!("invalid piece character '{ch}' in board layout"))?;

            if file >= 8 {
                return Err("board rank has too many files".to_owned());
            }

            let slot = free_slot_for(board, side, kind)
                .ok_or_else(|| format!("too many '{ch}' pieces for one side"))?;
            let square = Square { file, rank };
            board.put_piece(side, slot, square, kind);
            file += 1;
        }

        if file != 8 {
            return Err("board rank does not sum to 8 files".to_owned());
        }
    }

    Ok(())
}

fn free_slot_for(board: &Board, side: Color, kind: PieceKind) -> Option<usize> {
    candidate_slots(kind)
        .iter()
        .copied()
        .find(|&slot| board.pieces[side.index()][slot] == NO_SQUARE)
}

fn parse_side_to_move(side_part: &str) -> Result<Color, String> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(format!("invalid side-to-move field: {side_part}")),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, String> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_WHITE_KINGSIDE,
            'Q' => rights |= CASTLE_WHITE_QUEENSIDE,
            'k' => rights |= CASTLE_BLACK_KINGSIDE,
            'q' => rights |= CASTLE_BLACK_QUEENSIDE,
            // Placeholder dashes inside the field are tolerated.
            '-' => {}
            _ => return Err(format!("invalid castling rights character: {ch}")),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> Result<SquareCode, String> {
    if en_passant_part == "-" {
        return Ok(NO_SQUARE);
    }

    Ok(Square::from_algebraic(en_passant_part)?.code())
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let side = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    PieceKind::from_letter(ch).map(|kind| (side, kind))
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::*;
    use crate::game_state::square::Square;
    use crate::utils::render_board::render_board;

    #[test]
    fn parse_starting_fen_and_render_board() {
        let board = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");

        println!("\n{}", render_board(&board));

        assert_eq!(board.side_to_move, Color::White);
        assert_eq!(board.fullmove_number, 1);
        assert_eq!(board.halfmove_clock, 0);
        assert_eq!(board.piece_count(Color::White), 16);
    }

    #[test]
    fn ones_runs_are_accepted_for_empty_squares() {
        let spelled =
            parse_fen("rnbqkbnr/pppppppp/11111111/11111111/11111111/11111111/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .expect("descriptor with 1-runs should parse");
        let standard = parse_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert_eq!(spelled.fen(), standard.fen());
    }

    #[test]
    fn extra_pieces_spill_into_promotion_slots() {
        // Three white queens: one base slot plus two promotion slots.
        let board = parse_fen("4k3/8/8/8/8/8/QQQ5/4K3 w - - 0 1").expect("FEN should parse");
        let a2 = Square::from_algebraic("a2").expect("square should parse");
        let found = board.piece_at(a2.code()).expect("queen should be on a2");
        assert_eq!(found.slot, 3);
        assert_eq!(
            board.slot_kind(Color::White, FIRST_PROMOTION_SLOT),
            Some(PieceKind::Queen)
        );
        assert_eq!(
            board.slot_kind(Color::White, FIRST_PROMOTION_SLOT + 1),
            Some(PieceKind::Queen)
        );
    }

    #[test]
    fn field_errors_are_reported() {
        assert!(parse_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w KQxq - 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w - e9 0 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w - - zero 1").is_err());
        assert!(parse_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra").is_err());
    }

    #[test]
    fn en_passant_field_is_stored() {
        let board = parse_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").expect("FEN should parse");
        let e3 = Square::from_algebraic("e3").expect("square should parse");
        assert_eq!(board.en_passant, e3.code());
    }
}
