pub mod fen_generator;
pub mod fen_parser;
pub mod render_board;
