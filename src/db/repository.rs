//! Database repository for games and moves.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::error::is_unique_violation;
use crate::db::{DbError, GameRow, MoveRow, schema};
use crate::game::{Game, GameId, Move};
use crate::store::{GameStore, StoreError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// SQLite-backed repository. Every call opens its own connection.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS)).execute(&mut conn)?;
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Inserts a new game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the id already exists or a database error occurs.
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    pub fn insert_game(&self, game: &Game) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let row = GameRow::from_game(game)?;
        diesel::insert_into(schema::games::table)
            .values(&row)
            .execute(&mut conn)?;
        info!("Game inserted");
        Ok(())
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the row is malformed.
    #[instrument(skip(self))]
    pub fn find_game(&self, id: GameId) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::games::table
            .find(id.to_string())
            .select(GameRow::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => {
                debug!(version = row.version(), "Game found");
                Ok(Some(Game::try_from(row)?))
            }
            None => {
                debug!("Game not found");
                Ok(None)
            }
        }
    }

    /// Gets the move recorded for a request fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or the row is malformed.
    #[instrument(skip(self, fingerprint))]
    pub fn find_move(&self, fingerprint: &str) -> Result<Option<Move>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::moves::table
            .filter(schema::moves::request_hash.eq(fingerprint))
            .select(MoveRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(Move::try_from).transpose()
    }

    /// Lists the moves of a game in play order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_moves(&self, game_id: GameId) -> Result<Vec<Move>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::moves::table
            .filter(schema::moves::game_id.eq(game_id.to_string()))
            .order(schema::moves::move_number.asc())
            .select(MoveRow::as_select())
            .load(&mut conn)?;
        info!(count = rows.len(), "Moves loaded");
        rows.into_iter().map(Move::try_from).collect()
    }

    /// Updates the game and inserts its move in one transaction.
    ///
    /// The update only matches the row whose version is one below
    /// `game.version()`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved on or the
    /// fingerprint is already recorded, [`StoreError::Backend`] otherwise.
    #[instrument(skip(self, game, mv), fields(game_id = %game.id(), version = game.version()))]
    pub fn commit_move(&self, game: &Game, mv: &Move) -> Result<(), StoreError> {
        let mut conn = self.connection()?;
        let game_row = GameRow::from_game(game)?;
        let move_row = MoveRow::from_move(mv)?;
        let game_id = *game.id();

        conn.transaction::<_, StoreError, _>(|conn| {
            let updated = diesel::update(
                schema::games::table
                    .filter(schema::games::id.eq(game_row.id()))
                    .filter(schema::games::version.eq(game_row.version() - 1)),
            )
            .set(&game_row)
            .execute(conn)?;
            if updated == 0 {
                warn!("Stored version no longer matches");
                return Err(StoreError::Conflict(game_id));
            }

            diesel::insert_into(schema::moves::table)
                .values(&move_row)
                .execute(conn)
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        warn!("Fingerprint recorded concurrently");
                        StoreError::Conflict(game_id)
                    } else {
                        StoreError::from(e)
                    }
                })?;
            Ok(())
        })?;

        info!(sequence = mv.sequence(), "Game and move committed");
        Ok(())
    }
}

/// Runs blocking database work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| StoreError::Backend(DbError::new(format!("Database task failed: {}", e))))?
}

#[async_trait]
impl GameStore for GameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), StoreError> {
        let repo = self.clone();
        let game = game.clone();
        blocking(move || Ok(repo.insert_game(&game)?)).await
    }

    async fn get_game_by_id(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        let repo = self.clone();
        blocking(move || Ok(repo.find_game(id)?)).await
    }

    async fn find_move_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Move>, StoreError> {
        let repo = self.clone();
        let fingerprint = fingerprint.to_string();
        blocking(move || Ok(repo.find_move(&fingerprint)?)).await
    }

    async fn save_game_and_move(&self, game: &Game, mv: &Move) -> Result<(), StoreError> {
        let repo = self.clone();
        let game = game.clone();
        let mv = mv.clone();
        blocking(move || repo.commit_move(&game, &mv)).await
    }
}
