//! In-process store for tests and single-node demos.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument, warn};

use super::{GameStore, StoreError};
use crate::db::DbError;
use crate::game::{Game, GameId, Move};

#[derive(Debug, Default)]
struct Tables {
    games: HashMap<GameId, Game>,
    /// Moves keyed by fingerprint; fingerprints are unique like the SQL index.
    moves: HashMap<String, Move>,
}

/// Thread-safe in-memory [`GameStore`]. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded moves for a game.
    #[instrument(skip(self))]
    pub fn move_count_for(&self, game_id: GameId) -> Result<usize, StoreError> {
        let tables = self.lock()?;
        Ok(tables.moves.values().filter(|m| *m.game_id() == game_id).count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend(DbError::new("memory store lock poisoned")))
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    async fn create_game(&self, game: &Game) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.games.contains_key(game.id()) {
            return Err(StoreError::Backend(DbError::new(format!(
                "game {} already exists",
                game.id()
            ))));
        }
        tables.games.insert(*game.id(), game.clone());
        debug!("Game stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game_by_id(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        Ok(self.lock()?.games.get(&id).cloned())
    }

    #[instrument(skip(self, fingerprint))]
    async fn find_move_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Move>, StoreError> {
        Ok(self.lock()?.moves.get(fingerprint).cloned())
    }

    #[instrument(skip(self, game, mv), fields(game_id = %game.id(), version = game.version()))]
    async fn save_game_and_move(&self, game: &Game, mv: &Move) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let stored_version = match tables.games.get(game.id()) {
            Some(stored) => *stored.version(),
            None => {
                return Err(StoreError::Backend(DbError::new(format!(
                    "game {} does not exist",
                    game.id()
                ))));
            }
        };
        if stored_version + 1 != *game.version() || tables.moves.contains_key(mv.fingerprint()) {
            warn!(stored_version, "Rejected conflicting write");
            return Err(StoreError::Conflict(*game.id()));
        }
        tables.games.insert(*game.id(), game.clone());
        tables.moves.insert(mv.fingerprint().clone(), mv.clone());
        debug!("Game and move stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameSettings;
    use crate::game::{MoveRequest, RandomSource, apply_move, create_game, version_token};

    struct NoSwap;

    impl RandomSource for NoSwap {
        fn roll_percent(&mut self) -> u32 {
            100
        }
    }

    fn advance(game: &Game, row: usize, column: usize, fingerprint: &str) -> (Game, Move) {
        let mut next = game.clone();
        let request = MoveRequest::new(
            *game.id(),
            game.current_player().clone(),
            row as i32,
            column as i32,
            version_token(*game.version()),
        );
        let mv = apply_move(&mut next, &request, row, column, fingerprint.to_string(), &mut NoSwap)
            .unwrap();
        (next, mv)
    }

    #[tokio::test]
    async fn test_second_writer_on_same_version_conflicts() {
        let store = MemoryStore::new();
        let game = create_game("alice", "bob", &GameSettings::default()).unwrap();
        store.create_game(&game).await.unwrap();

        let (a, a_move) = advance(&game, 0, 0, "a");
        let (b, b_move) = advance(&game, 1, 1, "b");
        store.save_game_and_move(&a, &a_move).await.unwrap();
        assert_eq!(
            store.save_game_and_move(&b, &b_move).await.unwrap_err(),
            StoreError::Conflict(*game.id())
        );
        assert_eq!(store.get_game_by_id(*game.id()).await.unwrap(), Some(a));
        assert_eq!(store.move_count_for(*game.id()).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reused_fingerprint_conflicts() {
        let store = MemoryStore::new();
        let game = create_game("alice", "bob", &GameSettings::default()).unwrap();
        store.create_game(&game).await.unwrap();

        let (first, first_move) = advance(&game, 0, 0, "same");
        store.save_game_and_move(&first, &first_move).await.unwrap();
        let (second, second_move) = advance(&first, 1, 1, "same");
        assert!(matches!(
            store.save_game_and_move(&second, &second_move).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(*store.get_game_by_id(*game.id()).await.unwrap().unwrap().version(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_tables() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let game = create_game("alice", "bob", &GameSettings::default()).unwrap();
        store.create_game(&game).await.unwrap();
        assert!(clone.get_game_by_id(*game.id()).await.unwrap().is_some());
        assert!(clone.create_game(&game).await.is_err());
    }
}
