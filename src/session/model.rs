//! Session state and its client-facing snapshot.

use crate::games::tictactoe::{Board, Mark, Winner};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Unique identifier for a game session.
pub type SessionId = String;

/// Opaque client-supplied identifier for a player.
pub type PlayerId = String;

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSlot {
    /// Client-supplied player id.
    pub user_id: PlayerId,
    /// Display name.
    pub user_name: String,
    /// X for the creator, O for the joiner.
    pub symbol: Mark,
}

impl PlayerSlot {
    /// Builds a slot, falling back to `Player_<first 8 chars of id>` when no
    /// usable name was given.
    pub fn named_or_default(user_id: PlayerId, user_name: Option<String>, symbol: Mark) -> Self {
        let user_name = user_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| {
                let prefix: String = user_id.chars().take(8).collect();
                format!("Player_{prefix}")
            });
        Self::new(user_id, user_name, symbol)
    }
}

/// The most recent accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    /// Cell played (0-8).
    pub cell_index: usize,
    /// Mark written.
    pub player: Mark,
    /// When the server accepted it.
    pub timestamp: DateTime<Utc>,
}

/// Stored states of a rematch request. An accepted request is cleared at once,
/// so it never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResetStatus {
    /// Waiting for the other player.
    Requested,
    /// The other player declined; kept until the requester has seen it.
    Rejected,
}

/// Rematch handshake step sent by a client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResetAction {
    /// Ask the opponent for a new round.
    Request,
    /// Agree to the opponent's request.
    Accept,
    /// Decline the opponent's request.
    Reject,
}

/// In-flight rematch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReset {
    /// Player who asked for the new round.
    pub by: PlayerId,
    /// Where the handshake stands.
    pub status: ResetStatus,
    /// When the request was made.
    pub at: DateTime<Utc>,
    /// Player who declined, once rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<PlayerId>,
}

/// Authoritative state of one game session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Session id, fixed at creation.
    pub id: SessionId,
    /// Creator, always X.
    pub player1: PlayerSlot,
    /// Joiner, always O.
    pub player2: Option<PlayerSlot>,
    /// The board.
    pub board: Board,
    /// Mark to move next.
    pub current_player: Mark,
    /// Two players seated and no result yet.
    pub active: bool,
    /// Result of the current round.
    pub winner: Option<Winner>,
    /// Most recent accepted move.
    pub last_move: Option<LastMove>,
    /// Creation time, drives the retention sweep.
    pub created_at: DateTime<Utc>,
    /// Rematch handshake in progress.
    pub pending_reset: Option<PendingReset>,
}

impl GameSession {
    /// Creates a session waiting for its second player.
    #[instrument(skip(player1), fields(session_id = %id))]
    pub fn new(id: SessionId, player1: PlayerSlot, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            player1,
            player2: None,
            board: Board::new(),
            current_player: Mark::X,
            active: false,
            winner: None,
            last_move: None,
            created_at,
            pending_reset: None,
        }
    }

    /// Gets the seated player with the given id.
    pub fn player(&self, player_id: &str) -> Option<&PlayerSlot> {
        if self.player1.user_id == player_id {
            Some(&self.player1)
        } else {
            self.player2.as_ref().filter(|p| p.user_id == player_id)
        }
    }

    /// Whether `player_id` holds one of the two seats.
    pub fn is_player(&self, player_id: &str) -> bool {
        self.player(player_id).is_some()
    }

    /// Starts a fresh round: empty board, X to move, no result, no pending
    /// handshake.
    pub fn restart_round(&mut self) {
        self.board = Board::new();
        self.current_player = Mark::X;
        self.active = self.player2.is_some();
        self.winner = None;
        self.last_move = None;
        self.pending_reset = None;
    }

    /// Client-facing view of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            game_id: self.id.clone(),
            player1: self.player1.clone(),
            player2: self.player2.clone(),
            board: self.board,
            current_player: self.current_player,
            game_active: self.active,
            winner: self.winner,
            last_move: self.last_move,
            pending_reset: self.pending_reset.clone(),
        }
    }
}

/// What clients see when they fetch a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Session id.
    pub game_id: SessionId,
    /// Creator (X).
    pub player1: PlayerSlot,
    /// Joiner (O), once joined.
    #[serde(default)]
    pub player2: Option<PlayerSlot>,
    /// The board.
    pub board: Board,
    /// Mark to move next.
    pub current_player: Mark,
    /// Whether moves are accepted.
    pub game_active: bool,
    /// Result of the round.
    #[serde(default)]
    pub winner: Option<Winner>,
    /// Most recent move.
    #[serde(default)]
    pub last_move: Option<LastMove>,
    /// Rematch handshake in progress.
    #[serde(default)]
    pub pending_reset: Option<PendingReset>,
}

impl SessionSnapshot {
    /// Mark held by `player_id`, if seated.
    pub fn mark_of(&self, player_id: &str) -> Option<Mark> {
        if self.player1.user_id == player_id {
            Some(self.player1.symbol)
        } else {
            self.player2
                .as_ref()
                .filter(|p| p.user_id == player_id)
                .map(|p| p.symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name_uses_id_prefix() {
        let slot = PlayerSlot::named_or_default("1234567890".to_string(), None, Mark::X);
        assert_eq!(slot.user_name, "Player_12345678");

        let slot = PlayerSlot::named_or_default("42".to_string(), Some("  ".to_string()), Mark::O);
        assert_eq!(slot.user_name, "Player_42");

        let slot = PlayerSlot::named_or_default("42".to_string(), Some("Ann".to_string()), Mark::O);
        assert_eq!(slot.user_name, "Ann");
    }

    #[test]
    fn test_reset_action_parses_case_insensitively() {
        assert_eq!("ACCEPT".parse::<ResetAction>().unwrap(), ResetAction::Accept);
        assert_eq!("request".parse::<ResetAction>().unwrap(), ResetAction::Request);
        assert!("restart".parse::<ResetAction>().is_err());
        assert_eq!(ResetAction::Reject.to_string(), "reject");
    }

    #[test]
    fn test_snapshot_wire_names() {
        let session = GameSession::new(
            "game_abc".to_string(),
            PlayerSlot::new("u1".to_string(), "Ann".to_string(), Mark::X),
            Utc::now(),
        );
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["gameId"], "game_abc");
        assert_eq!(json["player1"]["userId"], "u1");
        assert_eq!(json["player1"]["symbol"], "X");
        assert_eq!(json["currentPlayer"], "X");
        assert_eq!(json["gameActive"], false);
        assert!(json["player2"].is_null());
        assert!(json["pendingReset"].is_null());
    }
}
