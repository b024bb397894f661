//! Core domain types for N-in-a-row games.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

/// Character stored for an empty cell.
pub const EMPTY_CELL: char = ' ';

/// Unique identifier for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Creates a new random game ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Mark placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Player X's mark (X moves first).
    X,
    /// Player O's mark.
    O,
}

impl Symbol {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    /// Character used for this mark on the wire and in storage.
    pub fn as_char(self) -> char {
        match self {
            Symbol::X => 'X',
            Symbol::O => 'O',
        }
    }

    /// Parses a mark from its character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Symbol::X),
            'O' => Some(Symbol::O),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing placed yet.
    Empty,
    /// Cell holds a mark.
    Occupied(Symbol),
}

impl Cell {
    /// Character representation (`' '`, `'X'` or `'O'`).
    pub fn as_char(self) -> char {
        match self {
            Cell::Empty => EMPTY_CELL,
            Cell::Occupied(symbol) => symbol.as_char(),
        }
    }
}

/// Error raised when a stored board cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Malformed board: {}", reason)]
pub struct BoardFormatError {
    /// What was wrong with the text.
    pub reason: String,
}

impl BoardFormatError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Square N×N grid of cells, addressed by `(row, column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Vec<Cell>>,
}

impl Board {
    /// Creates an empty `size`×`size` board.
    #[instrument]
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![vec![Cell::Empty; size]; size],
        }
    }

    /// Builds a board from explicit rows.
    pub fn from_cells(cells: Vec<Vec<Cell>>) -> Self {
        Self { cells }
    }

    /// Number of rows.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Gets the cell at `(row, col)`, or `None` when outside the row's bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        matches!(self.get(row, col), Some(Cell::Empty))
    }

    /// Places a mark. Callers validate coordinates first.
    pub(crate) fn place(&mut self, row: usize, col: usize, symbol: Symbol) {
        self.cells[row][col] = Cell::Occupied(symbol);
    }

    /// Returns the rows.
    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Counts occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| **c != Cell::Empty)
            .count()
    }

    /// Rows as characters, the shape returned to API clients.
    pub fn to_chars(&self) -> Vec<Vec<char>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.as_char()).collect())
            .collect()
    }

    /// Serializes the board for storage: a JSON array of row strings.
    pub fn to_text(&self) -> String {
        let rows: Vec<String> = self
            .cells
            .iter()
            .map(|row| row.iter().map(|c| c.as_char()).collect())
            .collect();
        // A Vec<String> cannot fail to serialize.
        serde_json::to_string(&rows).unwrap_or_default()
    }

    /// Parses a board previously produced by [`Board::to_text`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardFormatError`] if the text is not valid JSON, the grid is
    /// not square, or a cell holds an unknown character.
    #[instrument(skip(text))]
    pub fn from_text(text: &str) -> Result<Self, BoardFormatError> {
        let rows: Vec<String> = serde_json::from_str(text)
            .map_err(|e| BoardFormatError::new(format!("not a JSON row list: {}", e)))?;
        let size = rows.len();
        let mut cells = Vec::with_capacity(size);
        for (i, row) in rows.iter().enumerate() {
            let parsed = row
                .chars()
                .map(|c| match c {
                    EMPTY_CELL => Ok(Cell::Empty),
                    other => Symbol::from_char(other)
                        .map(Cell::Occupied)
                        .ok_or_else(|| BoardFormatError::new(format!("unknown cell '{}' in row {}", other, i))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if parsed.len() != size {
                return Err(BoardFormatError::new(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    parsed.len(),
                    size
                )));
            }
            cells.push(parsed);
        }
        Ok(Self { cells })
    }
}

/// Lifecycle status of a game. Every variant except `InProgress` is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Moves are still accepted.
    InProgress,
    /// Player X completed a line.
    XWon,
    /// Player O completed a line.
    OWon,
    /// The board filled up without a line.
    Draw,
}

impl GameStatus {
    /// Returns true once the game can no longer change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Status for a line completed with `symbol`.
    pub fn won_by(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => GameStatus::XWon,
            Symbol::O => GameStatus::OWon,
        }
    }
}

/// The authoritative game aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Game {
    pub(crate) id: GameId,
    pub(crate) player_x: String,
    pub(crate) player_o: String,
    pub(crate) current_player: String,
    pub(crate) board: Board,
    pub(crate) board_size: usize,
    pub(crate) win_line_length: usize,
    pub(crate) move_count: usize,
    pub(crate) status: GameStatus,
    pub(crate) version: i32,
}

impl Game {
    /// Mark belonging to `player`, if the name is registered in this game.
    pub fn symbol_for(&self, player: &str) -> Option<Symbol> {
        if player == self.player_x {
            Some(Symbol::X)
        } else if player == self.player_o {
            Some(Symbol::O)
        } else {
            None
        }
    }

    /// Name of the winning player, if the game was won.
    pub fn winner(&self) -> Option<&str> {
        match self.status {
            GameStatus::XWon => Some(&self.player_x),
            GameStatus::OWon => Some(&self.player_o),
            GameStatus::InProgress | GameStatus::Draw => None,
        }
    }
}

/// Immutable record of one applied turn.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Move {
    pub(crate) id: Uuid,
    pub(crate) game_id: GameId,
    pub(crate) player_name: String,
    pub(crate) row: usize,
    pub(crate) column: usize,
    pub(crate) symbol: Symbol,
    pub(crate) random_event: bool,
    pub(crate) sequence: usize,
    pub(crate) fingerprint: String,
    pub(crate) played_at: NaiveDateTime,
}

/// A player's request to place a mark.
///
/// `etag` is the version token the caller last observed; it is a transport
/// precondition and never part of the request fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct MoveRequest {
    /// Target game.
    pub game_id: GameId,
    /// Acting player's name.
    pub player_name: String,
    /// Zero-based row.
    pub row: i32,
    /// Zero-based column.
    pub column: i32,
    /// Version token presented by the caller.
    #[serde(default, skip_serializing)]
    pub etag: String,
}
