//! Error taxonomy for game operations.

use derive_more::{Display, Error};

use super::GameId;
use crate::db::DbError;
use crate::store::StoreError;

/// Every way a create, get or move operation can fail.
///
/// Validation and conflict variants are expected outcomes the caller can
/// recover from by re-reading state; only [`GameError::Storage`] signals a
/// broken backend.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// Missing, too long or duplicate player name.
    #[display("Invalid player: {}", _0)]
    PlayerValidation(#[error(not(source))] String),

    /// Board size or win-line length out of range.
    #[display("Invalid game settings: {}", _0)]
    GameValidation(#[error(not(source))] String),

    /// No game with this id.
    #[display("Game {} not found", _0)]
    GameNotFound(#[error(not(source))] GameId),

    /// Coordinates fall outside the board.
    #[display("Coordinates [{}, {}] are outside the board", row, column)]
    InvalidCoordinates {
        /// Requested row.
        row: i32,
        /// Requested column.
        column: i32,
    },

    /// Target cell already holds a mark.
    #[display("Cell [{}, {}] is already taken", row, column)]
    CellAlreadyTaken {
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
    },

    /// The acting player is not the one to move.
    #[display("It is not {}'s turn", _0)]
    WrongTurn(#[error(not(source))] String),

    /// The game has reached a terminal status.
    #[display("Game is already finished")]
    GameAlreadyFinished,

    /// Stale version token or diverged replay.
    #[display("Conflict: {}", _0)]
    GameConflict(#[error(not(source))] String),

    /// Persistence failure.
    #[display("{}", _0)]
    Storage(DbError),
}

impl From<DbError> for GameError {
    fn from(err: DbError) -> Self {
        GameError::Storage(err)
    }
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(id) => {
                GameError::GameConflict(format!("game {} was modified concurrently", id))
            }
            StoreError::Backend(e) => GameError::Storage(e),
        }
    }
}
