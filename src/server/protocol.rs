//! Wire protocol for the game server.
//!
//! Clients send moves as `SIDE_PIECE-FROM-TO` (for example `wP-e2-e4`); the
//! engine answers with position descriptors, `eval` lines, and the terminal
//! literals.

use thiserror::Error;

use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::square::Square;

pub const CHECKMATE_MESSAGE: &str = "Checkmate";
pub const DRAW_MESSAGE: &str = "Draw";
pub const STALEMATE_MESSAGE: &str = "stalemate";

/// Handshake value a client sends to take the black pieces.
pub const HANDSHAKE_BLACK: &str = "black";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed move message: {0}")]
    MalformedMove(String),

    #[error("unknown side letter: {0}")]
    UnknownSide(char),

    #[error("unknown piece letter: {0}")]
    UnknownPiece(char),

    #[error("bad square in move message: {0}")]
    BadSquare(String),
}

/// Decoded client move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMessage {
    pub side: Color,
    pub kind: PieceKind,
    pub from: Square,
    pub to: Square,
}

pub fn parse_move_message(line: &str) -> Result<MoveMessage, ProtocolError> {
    let mut parts = line.trim().split('-');
    let header = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedMove(line.to_owned()))?;
    let from = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedMove(line.to_owned()))?;
    let to = parts
        .next()
        .ok_or_else(|| ProtocolError::MalformedMove(line.to_owned()))?;
    if parts.next().is_some() || header.chars().count() != 2 {
        return Err(ProtocolError::MalformedMove(line.to_owned()));
    }

    let mut header_chars = header.chars();
    let side_char = header_chars.next().expect("length checked above");
    let piece_char = header_chars.next().expect("length checked above");

    let side = match side_char {
        'w' => Color::White,
        'b' => Color::Black,
        other => return Err(ProtocolError::UnknownSide(other)),
    };
    let kind =
        PieceKind::from_letter(piece_char).ok_or(ProtocolError::UnknownPiece(piece_char))?;

    let from =
        Square::from_algebraic(from).map_err(|_| ProtocolError::BadSquare(from.to_owned()))?;
    let to = Square::from_algebraic(to).map_err(|_| ProtocolError::BadSquare(to.to_owned()))?;

    Ok(MoveMessage {
        side,
        kind,
        from,
        to,
    })
}

/// Static-evaluation report sent after each ply.
pub fn eval_line(score: f64) -> String {
    format!("eval {score:.5}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_moves_parse() {
        let message = parse_move_message("wP-e2-e4").expect("message should parse");
        assert_eq!(message.side, Color::White);
        assert_eq!(message.kind, PieceKind::Pawn);
        assert_eq!(message.from.to_algebraic(), "e2");
        assert_eq!(message.to.to_algebraic(), "e4");

        let message = parse_move_message("bn-g8-f6").expect("message should parse");
        assert_eq!(message.side, Color::Black);
        assert_eq!(message.kind, PieceKind::Knight);
    }

    #[test]
    fn piece_letter_case_is_ignored() {
        let upper = parse_move_message("bQ-d8-d5").expect("message should parse");
        let lower = parse_move_message("bq-d8-d5").expect("message should parse");
        assert_eq!(upper, lower);
    }

    #[test]
    fn malformed_messages_are_rejected() {
        assert!(matches!(
            parse_move_message("wP-e2"),
            Err(ProtocolError::MalformedMove(_))
        ));
        assert!(matches!(
            parse_move_message("wPx-e2-e4"),
            Err(ProtocolError::MalformedMove(_))
        ));
        assert!(matches!(
            parse_move_message("xP-e2-e4"),
            Err(ProtocolError::UnknownSide('x'))
        ));
        assert!(matches!(
            parse_move_message("wZ-e2-e4"),
            Err(ProtocolError::UnknownPiece('Z'))
        ));
        assert!(matches!(
            parse_move_message("wP-e9-e4"),
            Err(ProtocolError::BadSquare(_))
        ));
    }

    #[test]
    fn eval_lines_use_five_decimals() {
        assert_eq!(eval_line(0.0), "eval 0.00000");
        assert_eq!(eval_line(-123.456789), "eval -123.45679");
    }
}
