//! Engine configuration and command-line parsing.

use std::path::PathBuf;

use crate::game_state::chess_rules::STARTING_POSITION_FEN;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Position descriptor every new game starts from.
    pub starting_position: String,
    /// Root search depth before the adaptive policy kicks in.
    pub base_depth: u32,
    /// 1-in-N chance of the searcher swapping near-equal best moves.
    pub random_chance: u32,
    /// Near-equal window for the randomized tie-break, in centipawns.
    pub random_threshold: f64,
    /// Total piece count below which the game counts as an endgame.
    pub endgame_piece_threshold: usize,
    /// host:port the game server listens on.
    pub listen_address: String,
    /// Optional transposition-table persistence file.
    pub transposition_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_position: STARTING_POSITION_FEN.to_owned(),
            base_depth: 5,
            random_chance: 200,
            random_threshold: 10.0,
            endgame_piece_threshold: 15,
            listen_address: "127.0.0.1:8080".to_owned(),
            transposition_file: None,
        }
    }
}

impl EngineConfig {
    /// Parse `--flag value` pairs; unknown flags are an error.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut config = Self::default();

        while let Some(flag) = args.next() {
            let mut value_for = |flag: &str| {
                args.next()
                    .ok_or_else(|| format!("missing value for {flag}"))
            };
            match flag.as_str() {
                "--startpos" => config.starting_position = value_for("--startpos")?,
                "--depth" => {
                    let value = value_for("--depth")?;
                    config.base_depth = value
                        .parse()
                        .map_err(|_| format!("invalid depth: {value}"))?;
                }
                "--random-chance" => {
                    let value = value_for("--random-chance")?;
                    let parsed: u32 = value
                        .parse()
                        .map_err(|_| format!("invalid random chance: {value}"))?;
                    if parsed == 0 {
                        return Err("random chance must be at least 1".to_owned());
                    }
                    config.random_chance = parsed;
                }
                "--random-threshold" => {
                    let value = value_for("--random-threshold")?;
                    config.random_threshold = value
                        .parse()
                        .map_err(|_| format!("invalid random threshold: {value}"))?;
                }
                "--endgame-threshold" => {
                    let value = value_for("--endgame-threshold")?;
                    config.endgame_piece_threshold = value
                        .parse()
                        .map_err(|_| format!("invalid endgame threshold: {value}"))?;
                }
                "--listen" => config.listen_address = value_for("--listen")?,
                "--tt-file" => {
                    config.transposition_file = Some(PathBuf::from(value_for("--tt-file")?))
                }
                other => return Err(format!("unknown flag: {other}")),
            }
        }

        Ok(config)
    }
}
