//! Game orchestration: the only entry point that combines the engine with
//! persistence.

mod idempotency;
mod views;

pub use idempotency::replay_existing;
pub use views::{GameView, MoveOutcome};

use std::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::config::GameSettings;
use crate::db::DbError;
use crate::game::validation::check_player_name;
use crate::game::{
    GameError, GameId, MoveRequest, RandomSource, apply_move, create_game, request_fingerprint,
    validate_move,
};
use crate::store::GameStore;

/// Creates games, reads them back and applies moves.
///
/// Holds no game state of its own; every call re-reads from the store.
#[derive(Debug)]
pub struct GameService<S, R> {
    store: S,
    settings: GameSettings,
    rng: Mutex<R>,
}

impl<S, R> GameService<S, R>
where
    S: GameStore,
    R: RandomSource + Send,
{
    /// Creates a service over `store`, creating games with `settings`.
    #[instrument(skip(store, rng))]
    pub fn new(store: S, settings: GameSettings, rng: R) -> Self {
        info!("Creating GameService");
        Self {
            store,
            settings,
            rng: Mutex::new(rng),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the settings applied to new games.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Starts a new game between two players.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad names or settings, or a storage
    /// error if the game could not be persisted.
    #[instrument(skip(self))]
    pub async fn create_game(&self, player_x: &str, player_o: &str) -> Result<GameView, GameError> {
        let game = create_game(player_x, player_o, &self.settings)?;
        self.store.create_game(&game).await?;
        info!(game_id = %game.id(), "Game created");
        Ok(GameView::from(&game))
    }

    /// Loads a game. Returns `Ok(None)` when no such game exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store fails.
    #[instrument(skip(self))]
    pub async fn get_game(&self, id: GameId) -> Result<Option<GameView>, GameError> {
        let game = self.store.get_game_by_id(id).await?;
        debug!(found = game.is_some(), "Game lookup");
        Ok(game.as_ref().map(GameView::from))
    }

    /// Applies a move, or replays it if the same request was already applied.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition, [`GameError::GameConflict`] when
    /// the presented version is stale or another writer won the race, or a
    /// storage error.
    #[instrument(skip(self, request), fields(game_id = %request.game_id, player = %request.player_name, row = request.row, column = request.column))]
    pub async fn make_move(&self, request: MoveRequest) -> Result<MoveOutcome, GameError> {
        let fingerprint = request_fingerprint(&request);
        if let Some(existing) = self.store.find_move_by_fingerprint(&fingerprint).await? {
            info!("Duplicate move request");
            return replay_existing(&self.store, &existing).await;
        }

        // Rejected before the store lookup; validate_move checks it again.
        check_player_name(&request.player_name)?;
        let loaded = self.store.get_game_by_id(request.game_id).await?;
        let (mut game, (row, column)) = validate_move(&request, loaded)?;

        let mv = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| DbError::new("random source lock poisoned"))?;
            apply_move(&mut game, &request, row, column, fingerprint, &mut *rng)?
        };

        self.store.save_game_and_move(&game, &mv).await?;
        info!(
            sequence = mv.sequence(),
            version = game.version(),
            status = %game.status(),
            "Move applied"
        );
        Ok(MoveOutcome::new(&game, &mv))
    }
}
