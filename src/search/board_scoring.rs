//! Static position evaluation.
//!
//! Material plus piece-square placement, in centipawns with positive values
//! favoring white. Placement tables are stored from white's side (rank 1
//! first) in centipawn-hundredths; black reads the vertical mirror. With
//! reduced material the king terms switch from shelter scoring to an
//! activity table plus a king-distance bonus for the stronger side.

use crate::game_state::board::Board;
use crate::game_state::chess_types::*;
use crate::game_state::square::{Square, NO_SQUARE};

/// Material weight of one piece, in centipawns.
#[inline]
pub const fn piece_value(kind: PieceKind) -> f64 {
    match kind {
        PieceKind::Pawn => 100.0,
        PieceKind::Knight => 300.0,
        PieceKind::Bishop => 300.0,
        PieceKind::Rook => 500.0,
        PieceKind::Queen => 900.0,
        PieceKind::King => 42000.0,
    }
}

/// Either side at or below this live-piece count flips the king terms into
/// their reduced-material form.
const REDUCED_MATERIAL_PIECES: usize = 5;

/// Weight of the king-distance bonus granted to the stronger side when the
/// opponent is reduced.
const KING_DISTANCE_FACTOR: f64 = 85.0;

/// Evaluate the position. Pure: identical boards always score identically.
pub fn evaluate(board: &Board) -> f64 {
    let mut total = 0.0;
    let mut counts = [0usize; 2];

    for side in [Color::White, Color::Black] {
        let sign = match side {
            Color::White => 1.0,
            Color::Black => -1.0,
        };
        for slot in 0..PIECE_SLOTS {
            let code = board.slot_code(side, slot);
            if code == NO_SQUARE {
                continue;
            }
            counts[side.index()] += 1;
            let kind = board
                .slot_kind(side, slot)
                .expect("occupied slot must resolve to a kind");
            total += sign * piece_value(kind);
            if kind == PieceKind::King {
                // King placement is handled by the phase-dependent terms.
                continue;
            }
            total += sign * placement(kind, side, Square::from_code(code));
        }
    }

    let white_pieces = counts[Color::White.index()];
    let black_pieces = counts[Color::Black.index()];

    if white_pieces <= REDUCED_MATERIAL_PIECES || black_pieces <= REDUCED_MATERIAL_PIECES {
        if total < 0.0 {
            // White is behind: score its king on the activity table and pay
            // black a distance bonus scaled by how reduced white is.
            if let Some(white_king) = board.king_square(Color::White) {
                total += table_read(&PST_KING_ACTIVITY, Color::White, white_king);
            }
            total -= king_distance_bonus(board, white_pieces);
        } else if total > 0.0 {
            if let Some(black_king) = board.king_square(Color::Black) {
                total -= table_read(&PST_KING_ACTIVITY, Color::Black, black_king);
            }
            total += king_distance_bonus(board, black_pieces);
        }
    } else {
        if let Some(white_king) = board.king_square(Color::White) {
            total += table_read(&PST_KING_SHELTER, Color::White, white_king);
        }
        if let Some(black_king) = board.king_square(Color::Black) {
            total -= table_read(&PST_KING_SHELTER, Color::Black, black_king);
        }
    }

    total
}

fn king_distance_bonus(board: &Board, losing_pieces: usize) -> f64 {
    let reduction = REDUCED_MATERIAL_PIECES.saturating_sub(losing_pieces) as f64;
    if reduction == 0.0 {
        return 0.0;
    }
    match (
        board.king_square(Color::White),
        board.king_square(Color::Black),
    ) {
        (Some(white), Some(black)) => {
            let distance = (f64::from(white.file) - f64::from(black.file)).abs()
                + (f64::from(white.rank) - f64::from(black.rank)).abs();
            KING_DISTANCE_FACTOR * distance * reduction
        }
        _ => 0.0,
    }
}

#[inline]
fn placement(kind: PieceKind, side: Color, square: Square) -> f64 {
    let table = match kind {
        PieceKind::Pawn => &PST_PAWN,
        PieceKind::Knight => &PST_KNIGHT,
        PieceKind::Bishop => &PST_BISHOP,
        PieceKind::Rook => &PST_ROOK,
        PieceKind::Queen => &PST_QUEEN,
        PieceKind::King => &PST_KING_SHELTER,
    };
    table_read(table, side, square)
}

#[inline]
fn table_read(table: &[i32; 64], side: Color, square: Square) -> f64 {
    let index = match side {
        Color::White => square.index(),
        Color::Black => (7 - square.rank as usize) * 8 + square.file as usize,
    };
    f64::from(table[index]) / 100.0
}

// Placement tables, white's view with rank 1 as the first row.

#[rustfmt::skip]
const PST_PAWN: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10, -20, -20,  10,  10,   5,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,   5,  10,  25,  25,  10,   5,   5,
     10,  10,  20,  30,  30,  20,  10,  10,
     50,  50,  50,  50,  50,  50,  50,  50,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PST_KNIGHT: [i32; 64] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const PST_BISHOP: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const PST_ROOK: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PST_QUEEN: [i32; 64] = [
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -10,   5,   5,   5,   5,   5,   0, -10,
      0,   0,   5,   5,   5,   5,   0,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
];

/// Center-favoring king placement used when material is reduced.
#[rustfmt::skip]
const PST_KING_ACTIVITY: [i32; 64] = [
    -50, -30, -30, -30, -30, -30, -30, -50,
    -30, -30,   0,   0,   0,   0, -30, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  30,  40,  40,  30, -10, -30,
    -30, -10,  20,  30,  30,  20, -10, -30,
    -30, -20, -10,   0,   0, -10, -20, -30,
    -50, -40, -30, -20, -20, -30, -40, -50,
];

/// Corner-favoring king placement used while both sides keep their armies.
#[rustfmt::skip]
const PST_KING_SHELTER: [i32; 64] = [
     20,  30,  10,   0,   0,  10,  30,  20,
     20,  20,   0,   0,   0,   0,  20,  20,
    -10, -20, -20, -20, -20, -20, -20, -10,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).expect("test FEN should parse")
    }

    #[test]
    fn start_position_is_balanced() {
        let board = Board::new_game();
        assert_eq!(evaluate(&board), 0.0);
    }

    #[test]
    fn evaluation_is_a_pure_function_of_the_position() {
        let board = board("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let first = evaluate(&board);
        assert_eq!(evaluate(&board), first);
        assert_eq!(evaluate(&board.clone()), first);
    }

    #[test]
    fn material_dominates_placement() {
        let up_a_rook = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let score = evaluate(&up_a_rook);
        assert!(score > 400.0, "rook advantage should exceed 4 pawns, got {score}");
    }

    #[test]
    fn mirrored_positions_score_symmetrically() {
        let white_up = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let black_up = board("r3k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let a = evaluate(&white_up);
        let b = evaluate(&black_up);
        assert!((a + b).abs() < 1e-9, "expected symmetry, got {a} and {b}");
    }

    #[test]
    fn central_knight_outscores_a_rim_knight() {
        let center = board("4k3/8/8/3N4/8/8/8/4K3 w - - 0 1");
        let rim = board("4k3/8/8/N7/8/8/8/4K3 w - - 0 1");
        assert!(evaluate(&center) > evaluate(&rim));
    }

    #[test]
    fn black_reads_the_mirrored_pawn_table() {
        // Both pawns one step from promotion: the placement terms cancel.
        let symmetric = board("4k3/P7/8/8/8/8/p7/4K3 w - - 0 1");
        assert!(evaluate(&symmetric).abs() < 1e-9);
    }

    #[test]
    fn rook_endgame_scores_positive_for_the_rook_side() {
        let board = board("4k3/R7/4K3/8/8/8/8/8 w - - 0 1");
        let score = evaluate(&board);
        assert!(score > 0.0, "expected a winning score, got {score}");
    }

    #[test]
    fn promoted_material_counts_at_its_new_value() {
        use crate::move_generation::move_engine::apply;

        let mut promoted = board("8/P3k3/8/8/8/8/8/4K3 w - - 0 1");
        let before = evaluate(&promoted);
        let pawn = promoted
            .find_slot(
                Color::White,
                PieceKind::Pawn,
                Square::from_algebraic("a7").expect("square should parse").code(),
            )
            .expect("pawn should be on a7");
        apply(
            &mut promoted,
            Color::White,
            pawn,
            Square::from_algebraic("a8").expect("square should parse"),
            PieceKind::Queen,
        )
        .expect("promotion should be legal");
        let after = evaluate(&promoted);
        assert!(
            after - before > 500.0,
            "queen promotion should raise the score well past a pawn: {before} -> {after}"
        );
    }
}
