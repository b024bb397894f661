//! SQLite persistence for games and their moves.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{GameRow, MoveRow};
pub use repository::GameRepository;
