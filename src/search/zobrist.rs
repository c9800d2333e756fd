//! Zobrist hashing for position identity and repetition tracking.
//!
//! The key table is generated from a fixed seed so hashes are reproducible
//! across runs. The key covers piece placement and the side to move; hash
//! collisions are tolerated by every consumer (the transposition table and
//! the repetition counter are both best-effort).

use std::sync::OnceLock;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind, PIECE_SLOTS};
use crate::game_state::square::{Square, NO_SQUARE};

/// 18 piece codes: nine per side, of which six are used.
const PIECE_CODES: usize = 18;

const ZOBRIST_SEED: u64 = 0x7C3A_95D1_4E68_B20F;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[u64; PIECE_CODES]; 64],
    black_to_move: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed = ZOBRIST_SEED;

    let mut piece_square = [[0u64; PIECE_CODES]; 64];
    for square in &mut piece_square {
        for key in square.iter_mut() {
            *key = next_random_u64(&mut seed);
        }
    }

    ZobristTables {
        piece_square,
        black_to_move: next_random_u64(&mut seed),
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn piece_code(side: Color, kind: PieceKind) -> usize {
    side.index() * 9 + kind.index()
}

/// Compute the position key: XOR of one entry per occupied square, toggled by
/// the side to move.
pub fn board_key(board: &Board) -> u64 {
    let mut key = 0u64;

    for side in [Color::White, Color::Black] {
        for slot in 0..PIECE_SLOTS {
            let code = board.slot_code(side, slot);
            if code == NO_SQUARE {
                continue;
            }
            let kind = board
                .slot_kind(side, slot)
                .expect("occupied slot must resolve to a kind");
            key ^= tables().piece_square[Square::from_code(code).index()][piece_code(side, kind)];
        }
    }

    if board.side_to_move == Color::Black {
        key ^= tables().black_to_move;
    }

    key
}
