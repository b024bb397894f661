//! Database rows and their mapping to domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{DbError, schema};
use crate::game::{Board, Game, GameId, GameStatus, Move, Symbol};

/// Game row. `created_at` is filled by the database and never selected.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: String,
    player_x: String,
    player_o: String,
    current_player: String,
    board: String,
    board_size: i32,
    win_line_length: i32,
    move_count: i32,
    status: String,
    version: i32,
}

impl GameRow {
    /// Flattens a game into its row.
    #[instrument(skip(game), fields(game_id = %game.id()))]
    pub fn from_game(game: &Game) -> Result<Self, DbError> {
        Ok(Self {
            id: game.id().to_string(),
            player_x: game.player_x().clone(),
            player_o: game.player_o().clone(),
            current_player: game.current_player().clone(),
            board: game.board().to_text(),
            board_size: to_db_int(*game.board_size())?,
            win_line_length: to_db_int(*game.win_line_length())?,
            move_count: to_db_int(*game.move_count())?,
            status: game.status().to_string(),
            version: *game.version(),
        })
    }
}

impl TryFrom<GameRow> for Game {
    type Error = DbError;

    #[instrument(skip(row), fields(game_id = %row.id))]
    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        let board = Board::from_text(&row.board)?;
        let board_size = from_db_int(row.board_size)?;
        if board.size() != board_size {
            return Err(DbError::new(format!(
                "Board of game {} has {} rows, expected {}",
                row.id,
                board.size(),
                board_size
            )));
        }
        Ok(Game {
            id: parse_game_id(&row.id)?,
            player_x: row.player_x,
            player_o: row.player_o,
            current_player: row.current_player,
            board,
            board_size,
            win_line_length: from_db_int(row.win_line_length)?,
            move_count: from_db_int(row.move_count)?,
            status: row
                .status
                .parse::<GameStatus>()
                .map_err(|_| DbError::new(format!("Invalid status: '{}'", row.status)))?,
            version: row.version,
        })
    }
}

/// Move row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, Identifiable, Getters)]
#[diesel(table_name = schema::moves)]
pub struct MoveRow {
    id: String,
    game_id: String,
    player_name: String,
    row_index: i32,
    column_index: i32,
    symbol: String,
    random_event: bool,
    move_number: i32,
    request_hash: String,
    played_at: NaiveDateTime,
}

impl MoveRow {
    /// Flattens a move into its row.
    #[instrument(skip(mv), fields(game_id = %mv.game_id(), sequence = mv.sequence()))]
    pub fn from_move(mv: &Move) -> Result<Self, DbError> {
        Ok(Self {
            id: mv.id().to_string(),
            game_id: mv.game_id().to_string(),
            player_name: mv.player_name().clone(),
            row_index: to_db_int(*mv.row())?,
            column_index: to_db_int(*mv.column())?,
            symbol: mv.symbol().to_string(),
            random_event: *mv.random_event(),
            move_number: to_db_int(*mv.sequence())?,
            request_hash: mv.fingerprint().clone(),
            played_at: *mv.played_at(),
        })
    }
}

impl TryFrom<MoveRow> for Move {
    type Error = DbError;

    #[instrument(skip(row), fields(move_id = %row.id))]
    fn try_from(row: MoveRow) -> Result<Self, Self::Error> {
        let symbol = row
            .symbol
            .chars()
            .next()
            .and_then(Symbol::from_char)
            .filter(|_| row.symbol.len() == 1)
            .ok_or_else(|| DbError::new(format!("Invalid symbol: '{}'", row.symbol)))?;
        Ok(Move {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| DbError::new(format!("Invalid move id '{}': {}", row.id, e)))?,
            game_id: parse_game_id(&row.game_id)?,
            player_name: row.player_name,
            row: from_db_int(row.row_index)?,
            column: from_db_int(row.column_index)?,
            symbol,
            random_event: row.random_event,
            sequence: from_db_int(row.move_number)?,
            fingerprint: row.request_hash,
            played_at: row.played_at,
        })
    }
}

fn parse_game_id(s: &str) -> Result<GameId, DbError> {
    s.parse()
        .map_err(|e| DbError::new(format!("Invalid game id '{}': {}", s, e)))
}

fn to_db_int(value: usize) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::new(format!("Value {} exceeds column range", value)))
}

fn from_db_int(value: i32) -> Result<usize, DbError> {
    usize::try_from(value).map_err(|_| DbError::new(format!("Negative value {} in column", value)))
}
