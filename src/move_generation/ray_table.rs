//! Precomputed movement geometry.
//!
//! For every (piece kind, origin square) the table stores up to 8 rays of up
//! to 7 packed square bytes, zero-terminated, with squares ordered nearest
//! first. Pawn tables are color-specific (direction of travel), and the king
//! tables embed the castling destinations as a second step on the east/west
//! rays from the home square. The tables are built once and never change.

use std::sync::OnceLock;

use crate::game_state::chess_rules::home_rank;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::square::{Square, SquareCode, NO_SQUARE};

pub const RAYS_PER_SQUARE: usize = 8;
pub const STEPS_PER_RAY: usize = 7;

/// All rays from one origin: `[ray][step]`, `NO_SQUARE`-terminated.
pub type SquareRays = [[SquareCode; STEPS_PER_RAY]; RAYS_PER_SQUARE];

/// One kind's full table, indexed by the origin's rank-major square index.
pub type PieceTable = [SquareRays; 64];

/// Which of the eight generated tables a piece consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    WhitePawn,
    BlackPawn,
    Knight,
    Rook,
    Bishop,
    Queen,
    WhiteKing,
    BlackKing,
}

/// Table a piece of `kind` on `side` walks.
#[inline]
pub fn table_kind(kind: PieceKind, side: Color) -> TableKind {
    match (kind, side) {
        (PieceKind::Pawn, Color::White) => TableKind::WhitePawn,
        (PieceKind::Pawn, Color::Black) => TableKind::BlackPawn,
        (PieceKind::King, Color::White) => TableKind::WhiteKing,
        (PieceKind::King, Color::Black) => TableKind::BlackKing,
        (PieceKind::Knight, _) => TableKind::Knight,
        (PieceKind::Rook, _) => TableKind::Rook,
        (PieceKind::Bishop, _) => TableKind::Bishop,
        (PieceKind::Queen, _) => TableKind::Queen,
    }
}

/// Rays reachable from `origin` for the given table.
#[inline]
pub fn rays_from(kind: TableKind, origin: Square) -> &'static SquareRays {
    let tables = tables();
    let table = match kind {
        TableKind::WhitePawn => &tables.white_pawn,
        TableKind::BlackPawn => &tables.black_pawn,
        TableKind::Knight => &tables.knight,
        TableKind::Rook => &tables.rook,
        TableKind::Bishop => &tables.bishop,
        TableKind::Queen => &tables.queen,
        TableKind::WhiteKing => &tables.white_king,
        TableKind::BlackKing => &tables.black_king,
    };
    &table[origin.index()]
}

struct MoveTables {
    white_pawn: PieceTable,
    black_pawn: PieceTable,
    knight: PieceTable,
    rook: PieceTable,
    bishop: PieceTable,
    queen: PieceTable,
    white_king: PieceTable,
    black_king: PieceTable,
}

static TABLES: OnceLock<MoveTables> = OnceLock::new();

#[inline]
fn tables() -> &'static MoveTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> MoveTables {
    MoveTables {
        white_pawn: build_piece_table(|sq| pawn_rays(sq, 1)),
        black_pawn: build_piece_table(|sq| pawn_rays(sq, -1)),
        knight: build_piece_table(knight_rays),
        rook: build_piece_table(|sq| slide_rays(sq, &ROOK_DIRECTIONS)),
        bishop: build_piece_table(|sq| slide_rays(sq, &BISHOP_DIRECTIONS)),
        queen: build_piece_table(|sq| slide_rays(sq, &QUEEN_DIRECTIONS)),
        white_king: build_piece_table(|sq| king_rays(sq, home_rank(Color::White))),
        black_king: build_piece_table(|sq| king_rays(sq, home_rank(Color::Black))),
    }
}

fn build_piece_table(rays_of: impl Fn(Square) -> Vec<Vec<Square>>) -> PieceTable {
    let mut table = [[[NO_SQUARE; STEPS_PER_RAY]; RAYS_PER_SQUARE]; 64];
    for file in 0..8u8 {
        for rank in 0..8u8 {
            let origin = Square { file, rank };
            table[origin.index()] = pack_rays(&rays_of(origin));
        }
    }
    table
}

fn pack_rays(rays: &[Vec<Square>]) -> SquareRays {
    assert!(rays.len() <= RAYS_PER_SQUARE, "ray table overflow");
    let mut packed = [[NO_SQUARE; STEPS_PER_RAY]; RAYS_PER_SQUARE];
    for (ray_idx, ray) in rays.iter().enumerate() {
        assert!(ray.len() <= STEPS_PER_RAY, "ray step overflow");
        for (step_idx, square) in ray.iter().enumerate() {
            packed[ray_idx][step_idx] = square.code();
        }
    }
    packed
}

#[inline]
fn offset(origin: Square, d_file: i8, d_rank: i8) -> Option<Square> {
    let file = origin.file as i8 + d_file;
    let rank = origin.rank as i8 + d_rank;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square {
            file: file as u8,
            rank: rank as u8,
        })
    } else {
        None
    }
}

/// Ray 0 is the non-capturing forward march (two steps from the start rank),
/// rays 1 and 2 the capture diagonals. Promotion-rank origins have no rays:
/// a pawn is promoted away before it could be asked again.
fn pawn_rays(origin: Square, dir: i8) -> Vec<Vec<Square>> {
    let mut rays = Vec::new();
    if origin.rank == 0 || origin.rank == 7 {
        return rays;
    }

    let start_rank = if dir > 0 { 1 } else { 6 };
    let mut forward = Vec::new();
    if let Some(step) = offset(origin, 0, dir) {
        forward.push(step);
        if origin.rank == start_rank {
            if let Some(double) = offset(origin, 0, 2 * dir) {
                forward.push(double);
            }
        }
    }
    rays.push(forward);

    if let Some(east) = offset(origin, 1, dir) {
        rays.push(vec![east]);
    }
    if let Some(west) = offset(origin, -1, dir) {
        rays.push(vec![west]);
    }
    rays
}

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (2, -1),
    (2, 1),
    (-2, -1),
    (-2, 1),
    (-1, 2),
    (1, 2),
    (-1, -2),
    (1, -2),
];

fn knight_rays(origin: Square) -> Vec<Vec<Square>> {
    KNIGHT_JUMPS
        .iter()
        .filter_map(|&(df, dr)| offset(origin, df, dr).map(|sq| vec![sq]))
        .collect()
}

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (-1, -1), (-1, 1), (1, -1)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
];

fn slide_rays(origin: Square, directions: &[(i8, i8)]) -> Vec<Vec<Square>> {
    let mut rays = Vec::new();
    for &(df, dr) in directions {
        let mut ray = Vec::new();
        let mut current = origin;
        while let Some(next) = offset(current, df, dr) {
            ray.push(next);
            current = next;
        }
        if !ray.is_empty() {
            rays.push(ray);
        }
    }
    rays
}

/// One step in the 8 directions; the east/west rays from the home square get
/// the castling destination appended as a second step.
fn king_rays(origin: Square, home: u8) -> Vec<Vec<Square>> {
    let mut rays = Vec::new();
    let at_home = origin.file == 4 && origin.rank == home;

    for &(df, dr) in QUEEN_DIRECTIONS.iter() {
        if let Some(step) = offset(origin, df, dr) {
            let mut ray = vec![step];
            if at_home && dr == 0 && (df == 1 || df == -1) {
                if let Some(castle) = offset(origin, 2 * df, 0) {
                    ray.push(castle);
                }
            }
            rays.push(ray);
        }
    }
    rays
}
