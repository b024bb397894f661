//! N-in-a-row game engine: domain types, rules, validation and the state
//! machine. Nothing in here touches storage.

mod error;
pub mod fingerprint;
pub mod machine;
pub mod rules;
mod types;
pub mod validation;

pub use error::GameError;
pub use fingerprint::{request_fingerprint, version_token};
pub use machine::{RandomSource, SeededRandom, apply_move, create_game};
pub use types::{
    Board, BoardFormatError, Cell, EMPTY_CELL, Game, GameId, GameStatus, Move, MoveRequest, Symbol,
};
pub use validation::validate_move;
