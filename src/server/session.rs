//! Per-connection game session.
//!
//! One session owns one game: the live board, the searcher with its
//! transposition table, and the adaptive depth policy. Messages are handled
//! strictly one at a time; the search monopolizes the thread until it
//! returns.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind};
use crate::game_state::square::Square;
use crate::move_generation::move_engine::{apply, apply_unchecked, in_check, legal_moves};
use crate::search::board_scoring::evaluate;
use crate::search::depth_policy::DepthPolicy;
use crate::search::minimax::{SearchConfig, Searcher};
use crate::search::transposition_table::TranspositionTable;
use crate::search::zobrist::board_key;
use crate::server::protocol::{
    eval_line, parse_move_message, CHECKMATE_MESSAGE, DRAW_MESSAGE, HANDSHAKE_BLACK,
    STALEMATE_MESSAGE,
};

pub struct GameSession {
    board: Board,
    searcher: Searcher,
    policy: DepthPolicy,
    config: EngineConfig,
    player_side: Color,
    engine_side: Color,
    handshaken: bool,
    player_moves: u32,
}

impl GameSession {
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        let board = Board::from_fen(&config.starting_position)?;

        let mut searcher = Searcher::new(SearchConfig {
            random_chance: config.random_chance,
            random_threshold: config.random_threshold,
        });
        if let Some(path) = &config.transposition_file {
            match TranspositionTable::load_from_file(path) {
                Ok(table) => {
                    info!(entries = table.len(), path = %path.display(), "loaded transposition table");
                    searcher.set_table(table);
                }
                Err(error) => {
                    warn!(%error, path = %path.display(), "starting with an empty transposition table");
                }
            }
        }

        let policy = DepthPolicy::new(config.base_depth, config.endgame_piece_threshold);

        Ok(Self {
            board,
            searcher,
            policy,
            config,
            player_side: Color::White,
            engine_side: Color::Black,
            handshaken: false,
            player_moves: 0,
        })
    }

    /// Drive the whole connection: handshake, then one exchange per line.
    pub fn run(&mut self, reader: impl BufRead, mut writer: impl Write) -> io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if !self.handshaken {
                self.handshake(line, &mut writer)?;
            } else {
                self.exchange(line, &mut writer)?;
            }
            writer.flush()?;
        }

        self.persist_table();
        Ok(())
    }

    /// First message: the client declares its color. When the engine ends up
    /// with white it answers with its first move straight away.
    fn handshake(&mut self, line: &str, writer: &mut impl Write) -> io::Result<()> {
        if line == HANDSHAKE_BLACK {
            self.player_side = Color::Black;
            self.engine_side = Color::White;
        }
        self.handshaken = true;
        info!(player = ?self.player_side, "game started");

        if self.engine_side == Color::White {
            self.engine_turn(writer)?;
            self.report_terminal(writer)?;
        }
        Ok(())
    }

    fn exchange(&mut self, line: &str, writer: &mut impl Write) -> io::Result<()> {
        let message = match parse_move_message(line) {
            Ok(message) => message,
            Err(error) => {
                warn!(%error, line, "rejected move message");
                return Ok(());
            }
        };
        if message.side != self.player_side {
            warn!(side = ?message.side, "client tried to move the wrong side");
            return Ok(());
        }

        if !self.try_player_move(&message, writer)? {
            return Ok(());
        }

        self.engine_turn(writer)?;
        self.report_terminal(writer)?;

        self.player_moves += 1;
        if self.player_moves % 2 == 0 {
            self.persist_table();
        }
        Ok(())
    }

    /// Returns true when the move was accepted and announced.
    fn try_player_move(
        &mut self,
        message: &crate::server::protocol::MoveMessage,
        writer: &mut impl Write,
    ) -> io::Result<bool> {
        let Some(slot) = self
            .board
            .find_slot(message.side, message.kind, message.from.code())
        else {
            warn!(
                from = %message.from.to_algebraic(),
                kind = ?message.kind,
                "no such piece to move"
            );
            return Ok(false);
        };

        // Promotion choice is not part of the wire format; queens it is.
        match apply(
            &mut self.board,
            message.side,
            slot,
            message.to,
            PieceKind::Queen,
        ) {
            Ok(record) => {
                self.board.record_repetition(board_key(&self.board));
                info!(
                    from = %message.from.to_algebraic(),
                    to = %message.to.to_algebraic(),
                    capture = record.is_capture(),
                    "player move"
                );
                writeln!(writer, "{}", self.board.fen())?;
                writeln!(writer, "{}", eval_line(evaluate(&self.board)))?;
                Ok(true)
            }
            Err(error) => {
                warn!(%error, line = %format!("{}-{}", message.from.to_algebraic(), message.to.to_algebraic()), "illegal move");
                Ok(false)
            }
        }
    }

    fn engine_turn(&mut self, writer: &mut impl Write) -> io::Result<()> {
        let depth = self.policy.depth();
        let start = Instant::now();
        let mut visited = 0u64;
        let (score, best) = self.searcher.search(
            &self.board,
            depth,
            f64::NEG_INFINITY,
            f64::INFINITY,
            self.engine_side,
            &mut visited,
        );
        let elapsed = start.elapsed();
        debug!(
            depth,
            states = visited,
            seconds = elapsed.as_secs_f64(),
            score,
            "search finished"
        );

        if let Some(record) = best {
            apply_unchecked(&mut self.board, self.engine_side, &record);
            self.board.record_repetition(board_key(&self.board));
            info!(
                to = %Square::from_code(record.to).to_algebraic(),
                capture = record.is_capture(),
                castle = record.is_castle(),
                score,
                "engine move"
            );
            writeln!(writer, "{}", self.board.fen())?;
            writeln!(writer, "{}", eval_line(evaluate(&self.board)))?;
        }

        self.policy.note_search_time(elapsed);
        self.policy.note_piece_count(self.board.total_pieces());
        if self.policy.in_endgame() {
            debug!(next_depth = self.policy.depth(), "endgame depth policy");
        }
        Ok(())
    }

    fn report_terminal(&mut self, writer: &mut impl Write) -> io::Result<()> {
        let to_move = self.board.side_to_move;
        if legal_moves(&self.board, to_move).is_empty() && !self.board.kings_only() {
            if in_check(&self.board, to_move) {
                info!(loser = ?to_move, "checkmate");
                writeln!(writer, "{CHECKMATE_MESSAGE}")?;
            } else {
                info!("draw by no legal moves");
                writeln!(writer, "{DRAW_MESSAGE}")?;
            }
        }
        if self.board.kings_only() {
            info!("bare kings");
            writeln!(writer, "{STALEMATE_MESSAGE}")?;
        }
        Ok(())
    }

    fn persist_table(&self) {
        let Some(path) = &self.config.transposition_file else {
            return;
        };
        match self.searcher.table().save_to_file(path) {
            Ok(()) => debug!(
                entries = self.searcher.table().len(),
                path = %path.display(),
                "saved transposition table"
            ),
            Err(error) => warn!(%error, "failed to save transposition table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_config(depth: u32) -> EngineConfig {
        EngineConfig {
            base_depth: depth,
            ..EngineConfig::default()
        }
    }

    fn run_session(config: EngineConfig, input: &str) -> Vec<String> {
        let mut session = GameSession::new(config).expect("session should build");
        let mut output = Vec::new();
        session
            .run(Cursor::new(input.to_owned()), &mut output)
            .expect("session should run");
        String::from_utf8(output)
            .expect("output should be utf-8")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn player_move_gets_a_descriptor_and_engine_reply() {
        let lines = run_session(test_config(1), "white\nwP-e2-e4\n");
        assert!(lines.len() >= 4, "expected two descriptors and two evals, got {lines:?}");
        assert!(lines[0].starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKB1R b"));
        assert!(lines[1].starts_with("eval "));
        assert!(lines[2].contains(" w "), "engine reply should hand the move back");
        assert!(lines[3].starts_with("eval "));
    }

    #[test]
    fn engine_opens_the_game_when_the_client_takes_black() {
        let lines = run_session(test_config(1), "black\n");
        assert!(!lines.is_empty());
        assert!(lines[0].contains(" b "), "white engine move leaves black to play");
        assert!(lines[1].starts_with("eval "));
    }

    #[test]
    fn illegal_and_malformed_moves_get_no_reply() {
        let lines = run_session(test_config(1), "white\nwP-e2-e5\nnonsense\nwQ-d1-d4\n");
        assert!(lines.is_empty(), "rejected input should stay silent, got {lines:?}");
    }

    #[test]
    fn checkmate_is_announced() {
        let config = EngineConfig {
            base_depth: 1,
            starting_position: "6k1/8/5QK1/8/8/8/8/8 w - - 0 1".to_owned(),
            ..EngineConfig::default()
        };
        let lines = run_session(config, "white\nwQ-f6-g7\n");
        assert_eq!(lines.len(), 3, "descriptor, eval, verdict: {lines:?}");
        assert!(lines[0].starts_with("6k1/6Q1/6K1"));
        assert!(lines[1].starts_with("eval "));
        assert_eq!(lines[2], CHECKMATE_MESSAGE);
    }

    #[test]
    fn bare_kings_report_stalemate() {
        let config = EngineConfig {
            base_depth: 1,
            starting_position: "4k3/8/8/8/8/8/3p4/4K3 w - - 0 1".to_owned(),
            ..EngineConfig::default()
        };
        let lines = run_session(config, "white\nwK-e1-d2\n");
        assert_eq!(lines.len(), 3, "descriptor, eval, verdict: {lines:?}");
        assert!(lines[1].starts_with("eval "));
        assert_eq!(lines[2], STALEMATE_MESSAGE);
    }
}
