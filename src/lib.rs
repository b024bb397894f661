//! tictactoe_server library - N-in-a-row games with safe concurrent moves
//!
//! # Architecture
//!
//! - **Game**: board, rules, validation and the state machine (pure)
//! - **Service**: orchestrates moves, replays duplicate requests
//! - **Store**: persistence boundary with an in-memory implementation
//! - **Db**: SQLite implementation via diesel
//! - **Server**: axum routes carrying version tokens in `ETag`/`If-Match`
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{GameService, GameSettings, MemoryStore, MoveRequest, SeededRandom};
//!
//! # async fn example() -> Result<(), tictactoe_server::GameError> {
//! let service = GameService::new(MemoryStore::new(), GameSettings::default(), SeededRandom::from_seed(1));
//! let game = service.create_game("alice", "bob").await?;
//! let request = MoveRequest::new(*game.id(), "alice".to_string(), 1, 1, game.etag().clone());
//! let outcome = service.make_move(request).await?;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod db;
mod game;
mod server;
mod service;
mod store;

// Crate-level exports - Configuration
pub use config::{AppConfig, ConfigError, DatabaseSettings, GameSettings, ServerSettings};

// Crate-level exports - Persistence
pub use db::{DbError, GameRepository, GameRow, MoveRow};
pub use store::{GameStore, MemoryStore, StoreError};

// Crate-level exports - Game engine
pub use game::fingerprint;
pub use game::machine::{RANDOM_EVENT_INTERVAL, RANDOM_EVENT_PERCENT};
pub use game::rules::{check_winner, is_draw, is_full};
pub use game::validation::{self, MAX_BOARD_SIZE, MAX_PLAYER_NAME_LEN, MIN_BOARD_SIZE};
pub use game::{
    Board, BoardFormatError, Cell, EMPTY_CELL, Game, GameError, GameId, GameStatus, Move,
    MoveRequest, RandomSource, SeededRandom, Symbol, apply_move, create_game,
    request_fingerprint, validate_move, version_token,
};

// Crate-level exports - Service and HTTP
pub use server::{AppState, ApiError, CreateGameRequest, ProblemDetails, if_match_token, router};
pub use service::{GameService, GameView, MoveOutcome, replay_existing};
