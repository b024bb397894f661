//! Response shapes returned by the service.

use derive_getters::Getters;
use serde::Serialize;

use crate::game::{Game, GameId, GameStatus, Move, version_token};

/// Snapshot of a game as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GameView {
    id: GameId,
    player_x: String,
    player_o: String,
    current_player: String,
    board: Vec<Vec<char>>,
    board_size: usize,
    win_line_length: usize,
    move_count: usize,
    status: GameStatus,
    /// Carried in the `ETag` header, not the body.
    #[serde(skip)]
    etag: String,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: *game.id(),
            player_x: game.player_x().clone(),
            player_o: game.player_o().clone(),
            current_player: game.current_player().clone(),
            board: game.board().to_chars(),
            board_size: *game.board_size(),
            win_line_length: *game.win_line_length(),
            move_count: *game.move_count(),
            status: *game.status(),
            etag: version_token(*game.version()),
        }
    }
}

/// Result of an applied (or replayed) move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct MoveOutcome {
    board: Vec<Vec<char>>,
    message: String,
    is_game_over: bool,
    winner: Option<String>,
    #[serde(skip)]
    etag: String,
}

impl MoveOutcome {
    /// Builds the outcome of `mv` against the game state it produced.
    pub fn new(game: &Game, mv: &Move) -> Self {
        Self {
            board: game.board().to_chars(),
            message: outcome_message(game, mv),
            is_game_over: game.status().is_terminal(),
            winner: game.winner().map(str::to_string),
            etag: version_token(*game.version()),
        }
    }
}

fn outcome_message(game: &Game, mv: &Move) -> String {
    let mut message = String::new();
    if *mv.random_event() {
        message.push_str("Random event! ");
    }
    message.push_str(&format!(
        "Player {} places {} at [{},{}]! ",
        mv.player_name(),
        mv.symbol(),
        mv.row(),
        mv.column()
    ));
    match game.status() {
        GameStatus::XWon | GameStatus::OWon => {
            if let Some(winner) = game.winner() {
                message.push_str(&format!("Player {} wins!", winner));
            }
        }
        GameStatus::Draw => message.push_str("Game over. Draw!"),
        GameStatus::InProgress => {}
    }
    message
}
