//! Central position state: piece slots, rights, en-passant, repetitions.
//!
//! `Board` is mutated only by the move engine and duplicated by value into
//! search scratch frames. Promotion kinds and the repetition counter live in
//! auxiliary maps that `Clone`/`clone_from` snapshot together with the slots.

use std::collections::HashMap;

use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::*;
use crate::game_state::square::{code_rank, Square, SquareCode, NO_SQUARE};
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

/// Identity of a piece on the board: owning side plus slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRef {
    pub side: Color,
    pub slot: usize,
}

#[derive(Debug, Clone)]
pub struct Board {
    /// Packed square codes per side and slot; `NO_SQUARE` marks a dead or
    /// unborn slot.
    pub pieces: [[SquareCode; PIECE_SLOTS]; 2],

    /// Kind of each occupied promotion slot, per side.
    pub promoted_kinds: [HashMap<usize, PieceKind>; 2],

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,

    /// En-passant target square code, or `NO_SQUARE` when none is pending.
    pub en_passant: SquareCode,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    /// Zobrist key -> number of times the position occurred in this game.
    pub repetitions: HashMap<u64, u32>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            pieces: [[NO_SQUARE; PIECE_SLOTS]; 2],
            promoted_kinds: [HashMap::new(), HashMap::new()],
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant: NO_SQUARE,
            halfmove_clock: 0,
            fullmove_number: 1,
            repetitions: HashMap::new(),
        }
    }
}

impl Board {
    /// Empty board used as the parser's construction target.
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn new_game() -> Self {
        parse_fen(STARTING_POSITION_FEN).expect("starting FEN should always parse")
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        parse_fen(fen)
    }

    #[inline]
    pub fn fen(&self) -> String {
        generate_fen(self)
    }

    /// Square code of a slot (`NO_SQUARE` when the slot is empty).
    #[inline]
    pub fn slot_code(&self, side: Color, slot: usize) -> SquareCode {
        self.pieces[side.index()][slot]
    }

    /// Current kind of a slot, resolving promoted slots through the kind map.
    /// `None` for empty slots.
    pub fn slot_kind(&self, side: Color, slot: usize) -> Option<PieceKind> {
        if self.pieces[side.index()][slot] == NO_SQUARE {
            return None;
        }
        if slot >= FIRST_PROMOTION_SLOT {
            self.promoted_kinds[side.index()].get(&slot).copied()
        } else {
            Some(base_slot_kind(slot))
        }
    }

    /// Look up the piece standing on `code`, ignoring the en-passant ghost.
    pub fn piece_at(&self, code: SquareCode) -> Option<PieceRef> {
        for side in [Color::White, Color::Black] {
            for (slot, &pos) in self.pieces[side.index()].iter().enumerate() {
                if pos != NO_SQUARE && pos == code {
                    return Some(PieceRef { side, slot });
                }
            }
        }
        None
    }

    /// Look up the piece on `code`, treating the en-passant target as occupied
    /// by the pawn that skipped over it.
    pub fn piece_at_with_ghost(&self, code: SquareCode) -> Option<PieceRef> {
        if self.en_passant != NO_SQUARE && code == self.en_passant {
            // The double-stepped pawn stands one rank past the skipped square.
            if code_rank(code) < 7 {
                if let Some(found) = self.piece_at(code + 1) {
                    return Some(found);
                }
            }
            if code_rank(code) > 0 {
                if let Some(found) = self.piece_at(code - 1) {
                    return Some(found);
                }
            }
        }
        self.piece_at(code)
    }

    /// Slot of `side` holding a piece of `kind` on the square `code`.
    pub fn find_slot(&self, side: Color, kind: PieceKind, code: SquareCode) -> Option<usize> {
        for slot in 0..PIECE_SLOTS {
            if self.pieces[side.index()][slot] == code && self.slot_kind(side, slot) == Some(kind) {
                return Some(slot);
            }
        }
        None
    }

    /// The side's king square, when its king slot is occupied.
    #[inline]
    pub fn king_square(&self, side: Color) -> Option<Square> {
        let code = self.pieces[side.index()][KING_SLOT];
        if code == NO_SQUARE {
            None
        } else {
            Some(Square::from_code(code))
        }
    }

    /// Number of live pieces for one side, king included.
    pub fn piece_count(&self, side: Color) -> usize {
        self.pieces[side.index()]
            .iter()
            .filter(|&&code| code != NO_SQUARE)
            .count()
    }

    #[inline]
    pub fn total_pieces(&self) -> usize {
        self.piece_count(Color::White) + self.piece_count(Color::Black)
    }

    /// True when only the two kings remain (immediate draw).
    pub fn kings_only(&self) -> bool {
        self.piece_count(Color::White) == 1 && self.piece_count(Color::Black) == 1
    }

    /// Record one occurrence of the position identified by `key`.
    #[inline]
    pub fn record_repetition(&mut self, key: u64) {
        *self.repetitions.entry(key).or_insert(0) += 1;
    }

    /// Times the position identified by `key` has been recorded.
    #[inline]
    pub fn repetition_count(&self, key: u64) -> u32 {
        self.repetitions.get(&key).copied().unwrap_or(0)
    }

    /// Place a piece during construction; the caller guarantees the square is
    /// free and the slot assignment valid.
    pub(crate) fn put_piece(&mut self, side: Color, slot: usize, square: Square, kind: PieceKind) {
        self.pieces[side.index()][slot] = square.code();
        if slot >= FIRST_PROMOTION_SLOT {
            self.promoted_kinds[side.index()].insert(slot, kind);
        }
    }
}
