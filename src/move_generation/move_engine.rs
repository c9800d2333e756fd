//! Move application, legality checking, and legal-move enumeration.
//!
//! All rule knowledge lives here: ray-table walking, castling, en passant,
//! promotion, and the speculative mutate/verify/rollback protocol that keeps
//! a side from leaving its own king in check. `apply` validates everything
//! and mutates the board only when the move stands; `apply_unchecked` replays
//! a record produced by `legal_moves` without re-validation.

use thiserror::Error;

use crate::game_state::board::Board;
use crate::game_state::chess_rules::home_rank;
use crate::game_state::chess_types::*;
use crate::game_state::square::{Square, SquareCode, NO_SQUARE};
use crate::move_generation::move_record::{CapturedPiece, CastleRook, MoveRecord};
use crate::move_generation::ray_table::{rays_from, table_kind};

/// Recoverable rejection reasons for `apply`. The board is unchanged whenever
/// one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// The slot is empty or does not hold the claimed piece.
    #[error("no piece in slot {slot} for {side:?}")]
    NoSuchPiece { side: Color, slot: usize },

    /// The destination is unreachable, blocked, or held by a friendly piece.
    #[error("destination {to:?} is not reachable for this piece")]
    IllegalMove { to: Square },

    /// Pawn-specific: forward motion cannot capture and the capture
    /// diagonals cannot be used without a capture.
    #[error("pawns cannot capture straight ahead or advance diagonally")]
    CaptureInNonCaptureRay,

    /// Everything else was legal but the mover's king would be attacked.
    #[error("move would leave the king in check")]
    LeavesKingInCheck,
}

/// True when any piece of `side` attacks `target`.
///
/// Walks each slot's ray table from its current square; any occupied square
/// terminates a ray. Pawn forward rays never attack.
pub fn side_attacks_square(board: &Board, side: Color, target: Square) -> bool {
    let target_code = target.code();

    for slot in 0..PIECE_SLOTS {
        let code = board.slot_code(side, slot);
        if code == NO_SQUARE {
            continue;
        }
        let kind = board
            .slot_kind(side, slot)
            .expect("occupied slot must resolve to a kind");
        let rays = rays_from(table_kind(kind, side), Square::from_code(code));

        for (ray_idx, ray) in rays.iter().enumerate() {
            if kind == PieceKind::Pawn && ray_idx == 0 {
                continue;
            }
            for &entry in ray.iter() {
                if entry == NO_SQUARE {
                    break;
                }
                if entry == target_code {
                    return true;
                }
                if board.piece_at(entry).is_some() {
                    break;
                }
            }
        }
    }
    false
}

/// True when `side`'s king stands on a square attacked by the opponent.
/// A side without a king (hand-built test positions) is never in check.
pub fn in_check(board: &Board, side: Color) -> bool {
    match board.king_square(side) {
        Some(king) => side_attacks_square(board, side.opposite(), king),
        None => false,
    }
}

/// Attempt a fully-validated move of `side`'s piece in `slot` to
/// `destination`. On success the board holds the new position with the side
/// to move flipped; on error the board is unchanged.
pub fn apply(
    board: &mut Board,
    side: Color,
    slot: usize,
    destination: Square,
    promote_to: PieceKind,
) -> Result<MoveRecord, MoveError> {
    let start_code = board.slot_code(side, slot);
    if start_code == NO_SQUARE {
        return Err(MoveError::NoSuchPiece { side, slot });
    }
    let kind = board
        .slot_kind(side, slot)
        .expect("occupied slot must resolve to a kind");
    let start = Square::from_code(start_code);
    let dest_code = destination.code();

    // A king on its home square moving onto a castling target follows the
    // castling protocol instead of the ray walk.
    if slot == KING_SLOT && start.file == 4 && start.rank == home_rank(side) {
        if destination == (Square { file: 6, rank: start.rank }) {
            return castle(board, side, CastleSide::KingSide);
        }
        if destination == (Square { file: 2, rank: start.rank }) {
            return castle(board, side, CastleSide::QueenSide);
        }
    }

    let walk = walk_to_destination(board, side, kind, start, destination)?;

    // Resolve the capture target, honoring the en-passant ghost square.
    let target = if walk.en_passant_capture {
        board.piece_at_with_ghost(dest_code)
    } else {
        board.piece_at(dest_code)
    };
    let mut captured: Option<(CapturedPiece, SquareCode)> = None;
    if let Some(found) = target {
        if found.side == side {
            return Err(MoveError::IllegalMove { to: destination });
        }
        if !walk.can_capture {
            return Err(MoveError::CaptureInNonCaptureRay);
        }
        let piece = CapturedPiece {
            side: found.side,
            slot: found.slot,
        };
        captured = Some((piece, board.slot_code(found.side, found.slot)));
    }

    let promotion =
        kind == PieceKind::Pawn && destination.rank == promotion_rank(side);

    // Tentative mutation.
    let old_rights = board.castling_rights;
    let old_en_passant = board.en_passant;

    board.pieces[side.index()][slot] = dest_code;

    if let Some((piece, _)) = captured {
        board.pieces[piece.side.index()][piece.slot] = NO_SQUARE;
        clear_captured_rook_right(board, piece);
    }

    board.en_passant = walk.new_en_passant;

    let mut promotion_slot = None;
    if promotion {
        let promo = allocate_promotion_slot(board, side);
        board.promoted_kinds[side.index()].insert(promo, promote_to);
        board.pieces[side.index()][promo] = dest_code;
        board.pieces[side.index()][slot] = NO_SQUARE;
        promotion_slot = Some(promo);
    }

    // Legality gate: roll everything back if the mover's king is attacked.
    if in_check(board, side) {
        board.pieces[side.index()][slot] = start_code;
        if let Some(promo) = promotion_slot {
            board.pieces[side.index()][promo] = NO_SQUARE;
            board.promoted_kinds[side.index()].remove(&promo);
        }
        if let Some((piece, original_code)) = captured {
            board.pieces[piece.side.index()][piece.slot] = original_code;
        }
        board.castling_rights = old_rights;
        board.en_passant = old_en_passant;
        return Err(MoveError::LeavesKingInCheck);
    }

    // Rights consumed by moving the king or a corner rook.
    if kind == PieceKind::King {
        board.castling_rights &= !both_rights(side);
    }
    if kind == PieceKind::Rook {
        if slot == QUEENSIDE_ROOK_SLOT {
            board.castling_rights &= !queenside_right(side);
        }
        if slot == KINGSIDE_ROOK_SLOT {
            board.castling_rights &= !kingside_right(side);
        }
    }

    board.side_to_move = side.opposite();

    Ok(MoveRecord {
        slot,
        to: dest_code,
        castle: None,
        rights_after: board.castling_rights,
        en_passant_after: board.en_passant,
        captured: captured.map(|(piece, _)| piece),
        promotion: if promotion { Some(promote_to) } else { None },
    })
}

/// Replay a record produced by `legal_moves` without validation, performing
/// the same mutations as `apply` (castling rook placement, capture clearing,
/// promotion allocation, side flip).
pub fn apply_unchecked(board: &mut Board, side: Color, record: &MoveRecord) {
    board.pieces[side.index()][record.slot] = record.to;
    if let Some(rook) = record.castle {
        board.pieces[side.index()][rook.slot] = rook.to;
    }
    board.castling_rights = record.rights_after;

    if let Some(piece) = record.captured {
        board.pieces[piece.side.index()][piece.slot] = NO_SQUARE;
    }

    board.en_passant = record.en_passant_after;

    if let Some(kind) = record.promotion {
        let promo = allocate_promotion_slot(board, side);
        board.promoted_kinds[side.index()].insert(promo, kind);
        board.pieces[side.index()][promo] = record.to;
        board.pieces[side.index()][record.slot] = NO_SQUARE;
    }

    board.side_to_move = side.opposite();
}

/// Promotion choices in enumeration order, queen first.
const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Enumerate every strictly legal move for `side`, ordered by slot, then ray
/// index, then step; a pawn step onto the last rank expands into one record
/// per promotion choice. An empty result means checkmate when the king is in
/// check and stalemate otherwise; a kings-only position yields no moves at
/// all (immediate draw).
pub fn legal_moves(board: &Board, side: Color) -> Vec<MoveRecord> {
    let mut moves = Vec::new();
    if board.kings_only() {
        return moves;
    }

    let mut scratch = board.clone();
    for slot in 0..PIECE_SLOTS {
        let code = board.slot_code(side, slot);
        if code == NO_SQUARE {
            continue;
        }
        let kind = board
            .slot_kind(side, slot)
            .expect("occupied slot must resolve to a kind");
        let rays = rays_from(table_kind(kind, side), Square::from_code(code));

        for ray in rays.iter() {
            for &entry in ray.iter() {
                if entry == NO_SQUARE {
                    break;
                }
                let destination = Square::from_code(entry);
                let choices: &[PieceKind] =
                    if kind == PieceKind::Pawn && destination.rank == promotion_rank(side) {
                        &PROMOTION_KINDS
                    } else {
                        &[PieceKind::Queen]
                    };
                for &promote_to in choices {
                    scratch.clone_from(board);
                    if let Ok(record) = apply(&mut scratch, side, slot, destination, promote_to) {
                        moves.push(record);
                    }
                }
            }
        }
    }
    moves
}

#[derive(Clone, Copy)]
enum CastleSide {
    KingSide,
    QueenSide,
}

fn castle(board: &mut Board, side: Color, wing: CastleSide) -> Result<MoveRecord, MoveError> {
    let rank = home_rank(side);
    let king_start = Square { file: 4, rank };
    let opponent = side.opposite();

    let (right, rook_slot, king_to, rook_to, must_be_empty, must_be_safe) = match wing {
        CastleSide::KingSide => (
            kingside_right(side),
            KINGSIDE_ROOK_SLOT,
            Square { file: 6, rank },
            Square { file: 5, rank },
            [Some(Square { file: 5, rank }), Some(Square { file: 6, rank }), None],
            [Square { file: 5, rank }, Square { file: 6, rank }],
        ),
        CastleSide::QueenSide => (
            queenside_right(side),
            QUEENSIDE_ROOK_SLOT,
            Square { file: 2, rank },
            Square { file: 3, rank },
            // The b-file square must be clear but may be attacked.
            [
                Some(Square { file: 1, rank }),
                Some(Square { file: 2, rank }),
                Some(Square { file: 3, rank }),
            ],
            [Square { file: 2, rank }, Square { file: 3, rank }],
        ),
    };

    let illegal = MoveError::IllegalMove { to: king_to };

    if board.castling_rights & right == 0 {
        return Err(illegal);
    }
    if side_attacks_square(board, opponent, king_start) {
        return Err(illegal);
    }
    for square in must_be_empty.into_iter().flatten() {
        if board.piece_at(square.code()).is_some() {
            return Err(illegal);
        }
    }
    for square in must_be_safe {
        if side_attacks_square(board, opponent, square) {
            return Err(illegal);
        }
    }

    board.pieces[side.index()][KING_SLOT] = king_to.code();
    board.pieces[side.index()][rook_slot] = rook_to.code();
    board.castling_rights &= !both_rights(side);
    board.en_passant = NO_SQUARE;
    board.side_to_move = side.opposite();

    Ok(MoveRecord {
        slot: KING_SLOT,
        to: king_to.code(),
        castle: Some(CastleRook {
            slot: rook_slot,
            to: rook_to.code(),
        }),
        rights_after: board.castling_rights,
        en_passant_after: NO_SQUARE,
        captured: None,
        promotion: None,
    })
}

struct WalkOutcome {
    can_capture: bool,
    new_en_passant: SquareCode,
    en_passant_capture: bool,
}

/// Walk the mover's rays until the destination matches, honoring blockers and
/// the pawn ray roles. Errors when no ray reaches the destination.
fn walk_to_destination(
    board: &Board,
    side: Color,
    kind: PieceKind,
    start: Square,
    destination: Square,
) -> Result<WalkOutcome, MoveError> {
    let dest_code = destination.code();
    let rays = rays_from(table_kind(kind, side), start);

    let mut empty_capture_ray = false;

    for (ray_idx, ray) in rays.iter().enumerate() {
        for (step_idx, &entry) in ray.iter().enumerate() {
            if entry == NO_SQUARE {
                break;
            }
            if entry == dest_code {
                if kind == PieceKind::Pawn {
                    if ray_idx == 0 {
                        let new_en_passant = if step_idx == 1 { ray[0] } else { NO_SQUARE };
                        return Ok(WalkOutcome {
                            can_capture: false,
                            new_en_passant,
                            en_passant_capture: false,
                        });
                    }
                    if board.piece_at_with_ghost(entry).is_some() {
                        let en_passant_capture =
                            board.en_passant != NO_SQUARE && entry == board.en_passant;
                        return Ok(WalkOutcome {
                            can_capture: true,
                            new_en_passant: NO_SQUARE,
                            en_passant_capture,
                        });
                    }
                    empty_capture_ray = true;
                    break;
                }
                if kind == PieceKind::King && step_idx > 0 {
                    // Embedded castling destinations never count as plain
                    // king steps.
                    break;
                }
                return Ok(WalkOutcome {
                    can_capture: true,
                    new_en_passant: NO_SQUARE,
                    en_passant_capture: false,
                });
            }
            if board.piece_at(entry).is_some() {
                break;
            }
        }
    }

    if empty_capture_ray {
        Err(MoveError::CaptureInNonCaptureRay)
    } else {
        Err(MoveError::IllegalMove { to: destination })
    }
}

#[inline]
fn promotion_rank(side: Color) -> u8 {
    match side {
        Color::White => crate::game_state::chess_rules::WHITE_PROMOTION_RANK,
        Color::Black => crate::game_state::chess_rules::BLACK_PROMOTION_RANK,
    }
}

fn clear_captured_rook_right(board: &mut Board, piece: CapturedPiece) {
    if piece.slot == QUEENSIDE_ROOK_SLOT {
        board.castling_rights &= !queenside_right(piece.side);
    }
    if piece.slot == KINGSIDE_ROOK_SLOT {
        board.castling_rights &= !kingside_right(piece.side);
    }
}

/// Lowest-indexed free promotion slot. Running out is a structural
/// impossibility (at most 8 promotions per side) and aborts the process.
fn allocate_promotion_slot(board: &Board, side: Color) -> usize {
    (FIRST_PROMOTION_SLOT..PIECE_SLOTS)
        .find(|&slot| board.pieces[side.index()][slot] == NO_SQUARE)
        .unwrap_or_else(|| panic!("no free promotion slot for {side:?}"))
}
