//! Move placement.

use super::super::{Board, CELL_COUNT, Cell, Mark};
use tracing::{instrument, warn};

/// Why a mark could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum RuleError {
    /// Index outside 0-8.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The cell already holds a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(usize),
}

impl std::error::Error for RuleError {}

/// Places `mark` at `index`, returning the new board.
///
/// The input board is left untouched, so a rejected move never changes state.
///
/// # Errors
///
/// Returns [`RuleError::OutOfBounds`] for an index past the last cell and
/// [`RuleError::Occupied`] when the cell is taken.
#[instrument(skip(board))]
pub fn apply_move(board: &Board, index: usize, mark: Mark) -> Result<Board, RuleError> {
    if index >= CELL_COUNT {
        warn!(index, "Move outside the board");
        return Err(RuleError::OutOfBounds(index));
    }
    if !board.is_empty(index) {
        warn!(index, "Move onto occupied cell");
        return Err(RuleError::Occupied(index));
    }

    let mut next = *board;
    next.write(index, Cell::from(mark));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_move_writes_mark() {
        let board = apply_move(&Board::new(), 4, Mark::X).unwrap();
        assert_eq!(board.get(4), Some(Cell::X));
        assert_eq!(board.occupied(), 1);
    }

    #[test]
    fn test_apply_move_rejects_out_of_bounds() {
        assert_eq!(
            apply_move(&Board::new(), 9, Mark::X),
            Err(RuleError::OutOfBounds(9))
        );
    }

    #[test]
    fn test_apply_move_rejects_occupied() {
        let board = apply_move(&Board::new(), 0, Mark::X).unwrap();
        assert_eq!(apply_move(&board, 0, Mark::O), Err(RuleError::Occupied(0)));
        // input board unchanged
        assert_eq!(board.get(0), Some(Cell::X));
    }
}
