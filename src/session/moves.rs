//! Move dispatch: ownership and occupancy checks ahead of the rules engine.

use super::error::SessionError;
use super::manager::SessionManager;
use super::model::{LastMove, SessionSnapshot};
use crate::games::tictactoe::{RuleError, Winner, apply_move, check_winner, is_draw};
use chrono::Utc;
use tracing::{info, instrument, warn};

impl SessionManager {
    /// Plays the caller's mark at `cell`.
    ///
    /// Checks run in a fixed order and the first failure wins: session exists,
    /// game active, caller seated, caller's turn, cell in range, cell empty.
    /// A rejected move leaves the stored session untouched.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`], [`SessionError::GameNotActive`],
    /// [`SessionError::NotAPlayer`], [`SessionError::NotYourTurn`],
    /// [`SessionError::InvalidCell`] or [`SessionError::CellOccupied`].
    #[instrument(skip(self))]
    pub fn make_move(
        &self,
        session_id: &str,
        player_id: &str,
        cell: usize,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.load(session_id)?;

        if !session.active {
            warn!(session_id, "Move on inactive game");
            return Err(SessionError::GameNotActive);
        }

        let mark = match session.player(player_id) {
            Some(player) => player.symbol,
            None => {
                warn!(session_id, player_id, "Move by non-player");
                return Err(SessionError::NotAPlayer);
            }
        };

        if mark != session.current_player {
            warn!(
                session_id,
                player_mark = %mark,
                expected = %session.current_player,
                "Player tried to move out of turn"
            );
            return Err(SessionError::NotYourTurn);
        }

        session.board = apply_move(&session.board, cell, mark).map_err(|e| match e {
            RuleError::OutOfBounds(i) => SessionError::InvalidCell(i),
            RuleError::Occupied(i) => SessionError::CellOccupied(i),
        })?;
        session.last_move = Some(LastMove::new(cell, mark, Utc::now()));
        session.current_player = mark.opponent();

        if check_winner(&session.board, mark) {
            session.winner = Some(Winner::from(mark));
            session.active = false;
            info!(session_id, %mark, "Round won");
        } else if is_draw(&session.board) {
            session.winner = Some(Winner::Draw);
            session.active = false;
            info!(session_id, "Round drawn");
        }

        self.save(session.clone())?;
        info!(session_id, player_id, cell, %mark, "Move accepted");
        Ok(session.snapshot())
    }
}
