//! Movement-tree leaf counting for validating the generator.

use crate::game_state::board::Board;
use crate::game_state::chess_types::Color;
use crate::move_generation::move_engine::{apply_unchecked, legal_moves};

/// Count the leaves of the legal-move tree `depth` plies deep. Last-rank pawn
/// steps count once per promotion choice.
pub fn perft(board: &Board, side: Color, depth: u32) -> u64 {
    let moves = legal_moves(board, side);
    if depth <= 1 {
        return moves.len() as u64;
    }

    let mut total = 0;
    let mut scratch = board.clone();
    for record in &moves {
        scratch.clone_from(board);
        apply_unchecked(&mut scratch, side, record);
        total += perft(&scratch, side.opposite(), depth - 1);
    }
    total
}
