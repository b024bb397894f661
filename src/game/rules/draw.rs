//! Draw detection for N-in-a-row.

use super::super::{Board, Cell};
use tracing::instrument;

/// Checks if the board is full (all cells occupied).
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().flatten().all(|c| *c != Cell::Empty)
}

/// A game without a line is drawn exactly when the move count reaches N².
///
/// Callers check for a win first.
#[instrument]
pub fn is_draw(move_count: usize, board_size: usize) -> bool {
    move_count == board_size * board_size
}
