//! Canonical chess-rule constants.

use crate::game_state::chess_types::Color;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// White pawns promote on this rank, black pawns on rank 0.
pub const WHITE_PROMOTION_RANK: u8 = 7;
pub const BLACK_PROMOTION_RANK: u8 = 0;

/// Home rank of each side's back-row pieces.
#[inline]
pub const fn home_rank(side: Color) -> u8 {
    match side {
        Color::White => 0,
        Color::Black => 7,
    }
}
