//! Bitboard engine for the 8x8 disc-flipping game (Reversi), with a
//! fixed-depth alpha-beta opponent.
//!
//! `board` holds the rules over two `u64` side masks, `engine` the search
//! and evaluator. `game` and `protocol` are the console and JSON front-ends
//! used by the binary.

pub mod board;
pub mod engine;
pub mod error;
pub mod game;
pub mod protocol;

pub use board::{
    apply_move, change_bit, format_position, has_any_legal_move, initial_boards, is_legal_move,
    parse_position, score, Bitboard, Board, Player, Position,
};
pub use engine::{best_move, evaluate, legal_moves, Engine, SearchResult, MAX_DEPTH};
pub use error::BoardError;
