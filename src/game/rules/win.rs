//! Win detection for N-in-a-row.

use super::super::{Board, Cell};
use tracing::instrument;

/// Axis directions; each is walked both forwards and backwards.
const AXES: [(isize, isize); 4] = [
    // Horizontal
    (0, 1),
    // Vertical
    (1, 0),
    // Main diagonal
    (1, 1),
    // Anti-diagonal
    (1, -1),
];

/// Checks whether the mark at `(row, col)` completes a line.
///
/// Only lines through the just-filled cell can contain it, so each of the
/// four axes is walked outward from that cell in both directions. Returns
/// `true` when any axis holds at least `win_line_length` contiguous equal
/// marks. An empty target cell never wins.
#[instrument(skip(board))]
pub fn check_winner(board: &Board, win_line_length: usize, row: usize, col: usize) -> bool {
    let symbol = match board.get(row, col) {
        Some(Cell::Occupied(symbol)) => symbol,
        Some(Cell::Empty) | None => return false,
    };
    let target = Cell::Occupied(symbol);

    AXES.iter().any(|&(dr, dc)| {
        let run = 1
            + count_in_direction(board, row, col, dr, dc, target)
            + count_in_direction(board, row, col, -dr, -dc, target);
        run >= win_line_length
    })
}

/// Counts matching cells from `(row, col)` (exclusive) along `(dr, dc)`.
fn count_in_direction(
    board: &Board,
    row: usize,
    col: usize,
    dr: isize,
    dc: isize,
    target: Cell,
) -> usize {
    let mut count = 0;
    let mut r = row as isize + dr;
    let mut c = col as isize + dc;
    while r >= 0 && c >= 0 && board.get(r as usize, c as usize) == Some(target) {
        count += 1;
        r += dr;
        c += dc;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::super::super::Symbol;
    use super::*;

    fn board_from(rows: &[&str]) -> Board {
        Board::from_cells(
            rows.iter()
                .map(|row| {
                    row.chars()
                        .map(|c| Symbol::from_char(c).map_or(Cell::Empty, Cell::Occupied))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn test_empty_cell_never_wins() {
        let board = Board::new(3);
        assert!(!check_winner(&board, 3, 1, 1));
    }

    #[test]
    fn test_winner_top_row() {
        let board = board_from(&["XXX", "OO ", "   "]);
        assert!(check_winner(&board, 3, 0, 2));
        assert!(check_winner(&board, 3, 0, 0));
        assert!(!check_winner(&board, 3, 1, 0));
    }

    #[test]
    fn test_winner_column() {
        let board = board_from(&["OX ", "OX ", "O  "]);
        assert!(check_winner(&board, 3, 2, 0));
    }

    #[test]
    fn test_winner_main_diagonal() {
        let board = board_from(&["O  ", "XO ", "X O"]);
        assert!(check_winner(&board, 3, 1, 1));
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let board = board_from(&["  X", " X ", "X  "]);
        assert!(check_winner(&board, 3, 2, 0));
    }

    #[test]
    fn test_no_winner_incomplete() {
        let board = board_from(&["XX ", "   ", "   "]);
        assert!(!check_winner(&board, 3, 0, 1));
    }

    #[test]
    fn test_short_line_on_large_board() {
        let board = board_from(&[
            "     ", //
            " OOO ", //
            "     ", //
            "     ", //
            "     ",
        ]);
        assert!(check_winner(&board, 3, 1, 2));
        assert!(!check_winner(&board, 4, 1, 2));
    }

    #[test]
    fn test_run_broken_by_opponent() {
        let board = board_from(&["XXOX", "    ", "    ", "    "]);
        assert!(!check_winner(&board, 3, 0, 3));
    }

    #[test]
    fn test_ragged_rows_use_row_bounds() {
        let board = board_from(&["XXX", "X", "X  "]);
        assert!(check_winner(&board, 3, 0, 0));
        assert!(check_winner(&board, 3, 1, 0));
        assert!(check_winner(&board, 3, 2, 0));
    }

    #[test]
    fn test_line_longer_than_required() {
        let board = board_from(&["XXXX", "    ", "    ", "    "]);
        assert!(check_winner(&board, 3, 0, 3));
    }
}
