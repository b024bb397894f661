//! Persistence boundary for games and moves.
//!
//! The service never caches games; every operation goes through a
//! [`GameStore`]. Implementations must make [`GameStore::save_game_and_move`]
//! atomic and conditional on the stored version.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use derive_more::{Display, Error};

use crate::db::DbError;
use crate::game::{Game, GameId, Move};

/// Failure reported by a [`GameStore`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum StoreError {
    /// The stored game no longer has the version the write was based on,
    /// or a move with the same fingerprint was recorded concurrently.
    #[display("Concurrent modification of game {}", _0)]
    Conflict(#[error(not(source))] GameId),

    /// Backend or I/O failure; nothing was written.
    #[display("{}", _0)]
    Backend(DbError),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Backend(err)
    }
}

/// Storage operations the game service depends on.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Durably inserts a new game.
    async fn create_game(&self, game: &Game) -> Result<(), StoreError>;

    /// Loads a game by id.
    async fn get_game_by_id(&self, id: GameId) -> Result<Option<Game>, StoreError>;

    /// Finds the move recorded for a request fingerprint.
    async fn find_move_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Move>, StoreError>;

    /// Atomically stores the updated game and its new move.
    ///
    /// `game.version()` is the version after the move; the write succeeds only
    /// if the stored version is exactly one less. Otherwise nothing is written
    /// and [`StoreError::Conflict`] is returned.
    async fn save_game_and_move(&self, game: &Game, mv: &Move) -> Result<(), StoreError>;
}
