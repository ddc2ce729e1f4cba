//! Session error types.

use super::model::{ResetAction, SessionId};

/// Category of a session failure; the HTTP layer maps each to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    /// Malformed input or a rule violation.
    BadRequest,
    /// Unknown session.
    NotFound,
    /// Caller does not hold a seat in the session.
    Forbidden,
    /// Unexpected fault inside the server.
    Internal,
}

/// Why a session operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SessionError {
    /// No session with this id (never existed or already swept).
    #[display("Game not found")]
    NotFound(SessionId),

    /// Second seat already taken.
    #[display("Game is already full")]
    AlreadyFull,

    /// Creator tried to join their own session.
    #[display("You cannot join your own game")]
    SelfJoin,

    /// Caller is neither player.
    #[display("You are not a player in this game")]
    NotAPlayer,

    /// Waiting for a second player, or the round is over.
    #[display("Game is not active")]
    GameNotActive,

    /// The caller's mark is not the current player.
    #[display("Not your turn")]
    NotYourTurn,

    /// Cell index outside 0-8.
    #[display("Cell index {} is out of range (must be 0-8)", _0)]
    InvalidCell(usize),

    /// Cell already holds a mark.
    #[display("Cell is already occupied")]
    CellOccupied(usize),

    /// Accept/reject without an outstanding request.
    #[display("No reset request to {}", _0)]
    NoPendingReset(ResetAction),

    /// A player answered their own request.
    #[display("You cannot {} your own request", _0)]
    OwnResetRequest(ResetAction),

    /// Handshake step not recognised.
    #[display("Unknown reset action")]
    UnknownResetAction(String),

    /// Backing store failed.
    #[display("Session store failure: {}", _0)]
    Store(String),
}

impl std::error::Error for SessionError {}

impl SessionError {
    /// Category used to pick a response code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NotFound(_) => ErrorKind::NotFound,
            SessionError::NotAPlayer => ErrorKind::Forbidden,
            SessionError::Store(_) => ErrorKind::Internal,
            SessionError::AlreadyFull
            | SessionError::SelfJoin
            | SessionError::GameNotActive
            | SessionError::NotYourTurn
            | SessionError::InvalidCell(_)
            | SessionError::CellOccupied(_)
            | SessionError::NoPendingReset(_)
            | SessionError::OwnResetRequest(_)
            | SessionError::UnknownResetAction(_) => ErrorKind::BadRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            SessionError::NotFound("g".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(SessionError::NotAPlayer.kind(), ErrorKind::Forbidden);
        assert_eq!(SessionError::NotYourTurn.kind(), ErrorKind::BadRequest);
        assert_eq!(
            SessionError::Store("poisoned".to_string()).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_reset_messages_name_the_action() {
        assert_eq!(
            SessionError::NoPendingReset(ResetAction::Accept).to_string(),
            "No reset request to accept"
        );
        assert_eq!(
            SessionError::OwnResetRequest(ResetAction::Reject).to_string(),
            "You cannot reject your own request"
        );
    }
}
