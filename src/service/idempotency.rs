//! Replay of moves that were already applied.

use tracing::{debug, instrument, warn};

use super::views::MoveOutcome;
use crate::game::{GameError, Move};
use crate::store::GameStore;

/// Rebuilds the outcome of a previously recorded move.
///
/// The replay is only valid while the move is still the latest one applied
/// to its game; once another move landed the stored outcome is no longer
/// reproducible and the request conflicts.
///
/// # Errors
///
/// Returns [`GameError::GameNotFound`] if the game vanished,
/// [`GameError::GameConflict`] if the game has moved on, or a storage error.
#[instrument(skip(store, existing), fields(game_id = %existing.game_id(), sequence = existing.sequence()))]
pub async fn replay_existing<S>(store: &S, existing: &Move) -> Result<MoveOutcome, GameError>
where
    S: GameStore + ?Sized,
{
    let game = store
        .get_game_by_id(*existing.game_id())
        .await?
        .ok_or(GameError::GameNotFound(*existing.game_id()))?;

    if game.move_count() != existing.sequence() {
        warn!(
            move_count = game.move_count(),
            "Duplicate request arrived after the game moved on"
        );
        return Err(GameError::GameConflict(format!(
            "move {} of game {} was already applied and the game has since advanced",
            existing.sequence(),
            game.id()
        )));
    }

    debug!("Replaying stored outcome");
    Ok(MoveOutcome::new(&game, existing))
}
