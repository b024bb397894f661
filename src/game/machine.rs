//! The game state machine.
//!
//! `InProgress` moves to `XWon`, `OWon` or `Draw`; the terminal statuses
//! have no outgoing transitions. [`apply_move`] is the only function that
//! mutates a [`Game`].

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::rules::{check_winner, is_draw};
use super::validation::{ensure_cell_empty, validate_new_game};
use super::{Board, Game, GameError, GameId, GameStatus, Move, MoveRequest};
use crate::config::GameSettings;

/// Every move whose resulting count is a multiple of this may trigger a swap.
pub const RANDOM_EVENT_INTERVAL: usize = 3;
/// Percent chance that an eligible move places the opponent's mark.
pub const RANDOM_EVENT_PERCENT: u32 = 10;

/// Source of the dice roll behind the symbol-swap rule.
pub trait RandomSource {
    /// Returns a uniformly distributed integer in `1..=100`.
    fn roll_percent(&mut self) -> u32;
}

/// Seedable [`RandomSource`] backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Deterministic source for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn roll_percent(&mut self) -> u32 {
        self.rng.gen_range(1..=100)
    }
}

/// Creates a fresh game: empty board, version 1, X to move.
///
/// # Errors
///
/// Returns [`GameError::PlayerValidation`] or [`GameError::GameValidation`]
/// when the inputs are out of range.
#[instrument(skip(settings), fields(board_size = settings.board_size(), win_line_length = settings.win_line_length()))]
pub fn create_game(
    player_x: &str,
    player_o: &str,
    settings: &GameSettings,
) -> Result<Game, GameError> {
    validate_new_game(player_x, player_o, settings)?;
    let size = *settings.board_size();
    let game = Game {
        id: GameId::new(),
        player_x: player_x.to_string(),
        player_o: player_o.to_string(),
        current_player: player_x.to_string(),
        board: Board::new(size),
        board_size: size,
        win_line_length: *settings.win_line_length(),
        move_count: 0,
        status: GameStatus::InProgress,
        version: 1,
    };
    debug!(game_id = %game.id, "Game constructed");
    Ok(game)
}

/// Applies a validated move and returns its record.
///
/// Must only be called after the request passed validation for `game`. The
/// cell is checked here, before anything is touched, so a failure leaves the
/// game unchanged. The placed mark is the acting player's unless the random
/// event swaps it; the winner is whoever owns the mark actually placed.
#[instrument(skip(game, request, fingerprint, rng), fields(game_id = %game.id, player = %request.player_name))]
pub fn apply_move<R: RandomSource + ?Sized>(
    game: &mut Game,
    request: &MoveRequest,
    row: usize,
    column: usize,
    fingerprint: String,
    rng: &mut R,
) -> Result<Move, GameError> {
    ensure_cell_empty(game, row, column)?;
    let intended = game
        .symbol_for(&request.player_name)
        .ok_or_else(|| GameError::WrongTurn(request.player_name.clone()))?;

    let sequence = game.move_count + 1;
    let (symbol, random_event) =
        if sequence % RANDOM_EVENT_INTERVAL == 0 && rng.roll_percent() <= RANDOM_EVENT_PERCENT {
            info!(sequence, "Random event swapped the placed symbol");
            (intended.opponent(), true)
        } else {
            (intended, false)
        };

    game.board.place(row, column, symbol);
    game.version += 1;
    game.current_player = if game.current_player == game.player_x {
        game.player_o.clone()
    } else {
        game.player_x.clone()
    };
    game.move_count = sequence;

    if game.move_count >= game.win_line_length
        && check_winner(&game.board, game.win_line_length, row, column)
    {
        game.status = GameStatus::won_by(symbol);
    } else if is_draw(game.move_count, game.board_size) {
        game.status = GameStatus::Draw;
    }

    debug!(
        version = game.version,
        move_count = game.move_count,
        status = %game.status,
        "Move applied"
    );

    Ok(Move {
        id: Uuid::new_v4(),
        game_id: game.id,
        player_name: request.player_name.clone(),
        row,
        column,
        symbol,
        random_event,
        sequence,
        fingerprint,
        played_at: Utc::now().naive_utc(),
    })
}
