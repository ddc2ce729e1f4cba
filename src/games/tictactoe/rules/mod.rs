//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](super::Board). Both the authoritative
//! server session and the single-device game evaluate terminal states
//! through this module only.

mod draw;
mod placement;
mod win;

pub use draw::{is_draw, is_full};
pub use placement::{RuleError, apply_move};
pub use win::{LINES, check_winner, winner, winning_line};
