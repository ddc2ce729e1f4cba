//! Tic-tac-toe: board types, the rules engine and hot-seat play.

mod local;
mod rules;
mod types;

pub use local::{LocalGame, LocalOutcome, Score};
pub use rules::{
    LINES, RuleError, apply_move, check_winner, is_draw, is_full, winner, winning_line,
};
pub use types::{Board, CELL_COUNT, Cell, Mark, Winner};
