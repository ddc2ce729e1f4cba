//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Mark};
use tracing::instrument;

/// The 8 winning triples: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns true iff `mark` fully occupies any of the 8 lines.
#[instrument(skip(board))]
pub fn check_winner(board: &Board, mark: Mark) -> bool {
    winning_line(board, mark).is_some()
}

/// Returns the first line fully occupied by `mark`.
#[instrument(skip(board))]
pub fn winning_line(board: &Board, mark: Mark) -> Option<[usize; 3]> {
    let cell = Cell::from(mark);
    LINES
        .into_iter()
        .find(|line| line.iter().all(|&i| board.get(i) == Some(cell)))
}

/// Returns the mark owning a complete line, if any.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Option<Mark> {
    [Mark::X, Mark::O]
        .into_iter()
        .find(|&mark| check_winner(board, mark))
}
