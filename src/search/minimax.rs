//! Depth-limited alpha-beta search.
//!
//! Plain minimax shape: white maximizes, black minimizes. The searcher keeps
//! a transposition table keyed by Zobrist hash, treats thrice-seen positions
//! as draws worth a hair more than zero, scales mate scores by remaining
//! depth so shallower mates win, and breaks near-ties with a seedable 1-in-N
//! randomization. Scratch boards are recycled through a frame pool instead of
//! being allocated per node.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::board::Board;
use crate::game_state::chess_types::Color;
use crate::move_generation::move_engine::{apply_unchecked, in_check, legal_moves};
use crate::move_generation::move_record::MoveRecord;
use crate::search::board_scoring::evaluate;
use crate::search::transposition_table::TranspositionTable;
use crate::search::zobrist::board_key;

/// Magnitude of a mate at the horizon; multiplied by `depth + 1` so mates
/// found higher in the tree dominate deeper ones.
pub const MATE_SCORE: f64 = 100_000.0;

/// Score returned for a position already seen three times. Slightly above
/// zero so callers can tell a repetition draw from a fresh evaluation.
pub const REPETITION_SCORE: f64 = 0.01;

/// Scores strictly inside (0, this) are treated as repetition draws and never
/// become the chosen move.
const REPETITION_WINDOW: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// 1-in-N chance of swapping the best move for a near-equal one.
    pub random_chance: u32,
    /// Two scores closer than this (centipawns) count as near-equal.
    pub random_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            random_chance: 200,
            random_threshold: 10.0,
        }
    }
}

pub struct Searcher {
    table: TranspositionTable,
    rng: StdRng,
    config: SearchConfig,
    frame_pool: Vec<Board>,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            table: TranspositionTable::new(),
            rng: StdRng::from_os_rng(),
            config,
            frame_pool: Vec::new(),
        }
    }

    /// Deterministic searcher for tests.
    pub fn with_seed(config: SearchConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new(config)
        }
    }

    #[inline]
    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Swap in a table loaded from disk.
    pub fn set_table(&mut self, table: TranspositionTable) {
        self.table = table;
    }

    /// Find the best move for `side` to `depth` plies. `visited` counts
    /// evaluated states and doubles as the root marker: repetition and
    /// transposition short-circuits only fire once it is non-zero.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        side: Color,
        visited: &mut u64,
    ) -> (f64, Option<MoveRecord>) {
        if depth == 0 {
            *visited += 1;
            return (evaluate(board), None);
        }
        if board.kings_only() {
            return (0.0, None);
        }

        let key = board_key(board);
        if *visited > 0 {
            if board.repetition_count(key) >= 3 {
                return (REPETITION_SCORE, None);
            }
            if let Some(entry) = self.table.probe(key) {
                if entry.depth >= depth {
                    *visited += 1;
                    return (entry.score, None);
                }
            }
        }

        let moves = legal_moves(board, side);
        if moves.is_empty() {
            return (terminal_score(board, side, depth), None);
        }

        let maximizing = side == Color::White;
        let mut best_score = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        let mut best_move = None;

        for record in &moves {
            *visited += 1;

            let mut scratch = self.frame_pool.pop().unwrap_or_default();
            scratch.clone_from(board);
            apply_unchecked(&mut scratch, side, record);
            let (score, _) =
                self.search(&scratch, depth - 1, alpha, beta, side.opposite(), visited);
            self.frame_pool.push(scratch);

            let improves = if maximizing {
                score > best_score
            } else {
                score < best_score
            };

            if score > 0.0 && score < REPETITION_WINDOW {
                // Repetition draws still bound the window below but are never
                // promoted to the chosen move.
            } else if improves {
                best_score = score;
                best_move = Some(*record);
            } else if (best_score - score).abs() < self.config.random_threshold
                && self.rng.random_range(0..self.config.random_chance) == 0
            {
                best_score = score;
                best_move = Some(*record);
            }

            if maximizing {
                alpha = alpha.max(score);
            } else {
                beta = beta.min(score);
            }
            if beta <= alpha {
                break;
            }
        }

        self.table.store(key, best_score, depth);
        (best_score, best_move)
    }
}

/// Score for a side with no legal moves: a depth-scaled mate when in check,
/// stalemate otherwise.
fn terminal_score(board: &Board, side: Color, depth: u32) -> f64 {
    if in_check(board, side) {
        let magnitude = MATE_SCORE * f64::from(depth + 1);
        match side {
            Color::White => -magnitude,
            Color::Black => magnitude,
        }
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::square::Square;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen).expect("test FEN should parse")
    }

    /// Randomized tie-breaking off, fixed seed.
    fn deterministic_searcher() -> Searcher {
        Searcher::with_seed(
            SearchConfig {
                random_chance: 200,
                random_threshold: 0.0,
            },
            7,
        )
    }

    fn full_window() -> (f64, f64) {
        (f64::NEG_INFINITY, f64::INFINITY)
    }

    #[test]
    fn depth_zero_returns_the_static_evaluation() {
        let board = Board::new_game();
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 0, alpha, beta, Color::White, &mut visited);
        assert_eq!(score, evaluate(&board));
        assert!(best.is_none());
        assert_eq!(visited, 1);
    }

    #[test]
    fn kings_only_is_an_immediate_draw() {
        let board = board("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 4, alpha, beta, Color::White, &mut visited);
        assert_eq!(score, 0.0);
        assert!(best.is_none());
    }

    #[test]
    fn search_takes_the_hanging_queen() {
        let board = board("4k3/8/8/8/8/8/4q3/4KQ2 w - - 0 1");
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 1, alpha, beta, Color::White, &mut visited);
        let best = best.expect("a best move should exist");
        assert_eq!(best.to, Square::from_algebraic("e2").expect("square").code());
        assert!(score > 800.0, "capturing the queen should score high, got {score}");
    }

    #[test]
    fn search_finds_mate_in_one_at_depth_two() {
        let board = board("6k1/8/5QK1/8/8/8/8/8 w - - 0 1");
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 2, alpha, beta, Color::White, &mut visited);

        let best = best.expect("a best move should exist");
        let mut next = board.clone();
        apply_unchecked(&mut next, Color::White, &best);
        assert!(legal_moves(&next, Color::Black).is_empty());
        assert!(in_check(&next, Color::Black));
        assert!(score >= MATE_SCORE, "mate should dominate material, got {score}");
    }

    #[test]
    fn thrice_seen_positions_score_as_repetition_draws() {
        let mut board = Board::new_game();
        let key = board_key(&board);
        for _ in 0..3 {
            board.record_repetition(key);
        }

        let mut searcher = deterministic_searcher();
        let mut visited = 1; // non-root
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 3, alpha, beta, Color::White, &mut visited);
        assert_eq!(score, REPETITION_SCORE);
        assert!(best.is_none());
    }

    #[test]
    fn repetition_draws_are_gated_to_non_root_calls() {
        let mut board = Board::new_game();
        let key = board_key(&board);
        for _ in 0..3 {
            board.record_repetition(key);
        }

        let mut searcher = deterministic_searcher();
        let mut visited = 0; // root
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 1, alpha, beta, Color::White, &mut visited);
        assert_ne!(score, REPETITION_SCORE);
        assert!(best.is_some());
    }

    #[test]
    fn deep_transposition_entries_short_circuit_shallower_searches() {
        let board = board("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
        let mut searcher = deterministic_searcher();
        searcher.table.store(board_key(&board), 123.5, 10);

        let mut visited = 1; // non-root
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 2, alpha, beta, Color::Black, &mut visited);
        assert_eq!(score, 123.5);
        assert!(best.is_none());
    }

    #[test]
    fn search_results_are_stored_in_the_table() {
        let board = board("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, _) = searcher.search(&board, 2, alpha, beta, Color::White, &mut visited);

        let entry = searcher
            .table()
            .probe(board_key(&board))
            .expect("root position should be cached");
        assert_eq!(entry.score, score);
        assert_eq!(entry.depth, 2);
    }

    #[test]
    fn seeded_searchers_are_reproducible() {
        let board = Board::new_game();
        let config = SearchConfig::default();

        let mut first = Searcher::with_seed(config, 42);
        let mut second = Searcher::with_seed(config, 42);
        let mut visited_a = 0;
        let mut visited_b = 0;
        let (alpha, beta) = full_window();
        let (score_a, best_a) = first.search(&board, 2, alpha, beta, Color::White, &mut visited_a);
        let (score_b, best_b) = second.search(&board, 2, alpha, beta, Color::White, &mut visited_b);

        assert_eq!(score_a, score_b);
        assert_eq!(best_a, best_b);
        assert_eq!(visited_a, visited_b);
    }

    #[test]
    fn black_minimizes() {
        // Black queen can take a hanging white rook.
        let board = board("3qk3/8/8/8/8/8/8/3RK3 b - - 0 1");
        let mut searcher = deterministic_searcher();
        let mut visited = 0;
        let (alpha, beta) = full_window();
        let (score, best) = searcher.search(&board, 1, alpha, beta, Color::Black, &mut visited);
        let best = best.expect("a best move should exist");
        assert_eq!(best.to, Square::from_algebraic("d1").expect("square").code());
        assert!(score < -300.0, "black should come out ahead, got {score}");
    }
}
