//! Client-side rendering cache rebuilt from server snapshots.

use crate::games::tictactoe::{Board, Mark, Score, Winner};
use crate::session::{PendingReset, PlayerId, PlayerSlot, ResetStatus, SessionSnapshot};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use tracing::{debug, instrument};

/// Something the UI should react to after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The opponent's seat became known.
    OpponentJoined {
        /// Opponent's display name.
        name: String,
    },
    /// Board differs from the previous snapshot.
    BoardChanged(Board),
    /// Round finished. Fired once per round.
    GameOver(Winner),
    /// The opponent asked for a rematch. Fired once per request.
    ResetRequested {
        /// Requester's display name.
        by: String,
    },
    /// Our own rematch request is waiting for an answer.
    AwaitingResetResponse,
    /// Our own rematch request was declined. Fired once.
    ResetRejected,
    /// A fresh round started.
    RoundRestarted,
}

/// Latest known state of a session, as seen by one player.
///
/// The server is authoritative: [`ClientView::apply`] overwrites every field
/// from the snapshot and only keeps the one-shot flags and the running score.
#[derive(Debug, Clone, Getters)]
pub struct ClientView {
    user_id: PlayerId,
    symbol: Option<Mark>,
    opponent: Option<PlayerSlot>,
    board: Board,
    current_player: Mark,
    active: bool,
    winner: Option<Winner>,
    pending_reset: Option<PendingReset>,
    score: Score,
    #[getter(skip)]
    result_shown: bool,
    #[getter(skip)]
    reset_prompt_shown: bool,
    #[getter(skip)]
    awaiting_shown: bool,
    #[getter(skip)]
    rejection_shown: bool,
    #[getter(skip)]
    pending_key: Option<(PlayerId, DateTime<Utc>)>,
}

impl ClientView {
    /// Creates an empty view for `user_id`.
    pub fn new(user_id: PlayerId) -> Self {
        Self {
            user_id,
            symbol: None,
            opponent: None,
            board: Board::new(),
            current_player: Mark::X,
            active: false,
            winner: None,
            pending_reset: None,
            score: Score::default(),
            result_shown: false,
            reset_prompt_shown: false,
            awaiting_shown: false,
            rejection_shown: false,
            pending_key: None,
        }
    }

    /// Whether the local player may move now.
    pub fn is_my_turn(&self) -> bool {
        self.active && self.symbol == Some(self.current_player)
    }

    /// Replaces the cached state with `snapshot` and reports what changed.
    #[instrument(skip(self, snapshot), fields(game_id = %snapshot.game_id))]
    pub fn apply(&mut self, snapshot: SessionSnapshot) -> Vec<ViewEvent> {
        let mut events = Vec::new();

        self.symbol = snapshot.mark_of(&self.user_id);
        let opponent = if snapshot.player1.user_id == self.user_id {
            snapshot.player2.clone()
        } else {
            Some(snapshot.player1.clone())
        };
        if let (None, Some(joined)) = (&self.opponent, &opponent) {
            events.push(ViewEvent::OpponentJoined {
                name: joined.user_name.clone(),
            });
        }

        // A new round may already have moves by the time this client polls.
        let restarted = (self.winner.is_some() && snapshot.winner.is_none())
            || snapshot.board.occupied() < self.board.occupied();
        if snapshot.winner.is_none() {
            self.result_shown = false;
        }
        if restarted {
            events.push(ViewEvent::RoundRestarted);
            if snapshot.board.occupied() > 0 {
                events.push(ViewEvent::BoardChanged(snapshot.board));
            }
        } else if snapshot.board != self.board {
            events.push(ViewEvent::BoardChanged(snapshot.board));
        }

        if let Some(winner) = snapshot.winner.filter(|_| !self.result_shown) {
            self.result_shown = true;
            if let Some(mark) = winner.mark() {
                self.score.record(mark);
            }
            events.push(ViewEvent::GameOver(winner));
        }

        let pending_key = snapshot
            .pending_reset
            .as_ref()
            .map(|pending| (pending.by.clone(), pending.at));
        if pending_key != self.pending_key {
            self.reset_prompt_shown = false;
            self.awaiting_shown = false;
            self.rejection_shown = false;
            self.pending_key = pending_key;
        }
        if let Some(pending) = &snapshot.pending_reset {
            let mine = pending.by == self.user_id;
            match (pending.status, mine) {
                (ResetStatus::Requested, false) if !self.reset_prompt_shown => {
                    self.reset_prompt_shown = true;
                    let by = opponent
                        .as_ref()
                        .map(|o| o.user_name.clone())
                        .unwrap_or_else(|| pending.by.clone());
                    events.push(ViewEvent::ResetRequested { by });
                }
                (ResetStatus::Requested, true) if !self.awaiting_shown => {
                    self.awaiting_shown = true;
                    events.push(ViewEvent::AwaitingResetResponse);
                }
                (ResetStatus::Rejected, true) if !self.rejection_shown => {
                    self.rejection_shown = true;
                    events.push(ViewEvent::ResetRejected);
                }
                _ => {}
            }
        }

        self.opponent = opponent;
        self.board = snapshot.board;
        self.current_player = snapshot.current_player;
        self.active = snapshot.game_active;
        self.winner = snapshot.winner;
        self.pending_reset = snapshot.pending_reset;

        debug!(events = events.len(), "Applied snapshot");
        events
    }

    /// One-line status for display.
    pub fn status(&self) -> String {
        if let Some(winner) = self.winner {
            return match (winner.mark(), self.symbol) {
                (None, _) => "It's a draw!".to_string(),
                (Some(mark), Some(mine)) if mark == mine => "You win!".to_string(),
                (Some(_), Some(_)) => "You lose!".to_string(),
                (Some(mark), None) => format!("{} wins!", mark),
            };
        }
        if self.opponent.is_none() {
            return "Waiting for opponent...".to_string();
        }
        if self.is_my_turn() {
            format!("Your turn ({})", self.current_player)
        } else {
            format!("Opponent's turn ({})", self.current_player)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionManager;

    fn started() -> (SessionManager, String) {
        let manager = SessionManager::in_memory();
        let session = manager.create("alice".to_string(), Some("Alice".to_string())).unwrap();
        manager
            .join(&session.id, "bob".to_string(), Some("Bob".to_string()))
            .unwrap();
        (manager, session.id)
    }

    #[test]
    fn test_opponent_joined_fires_once() {
        let manager = SessionManager::in_memory();
        let session = manager.create("alice".to_string(), None).unwrap();
        let mut view = ClientView::new("alice".to_string());

        let events = view.apply(manager.state(&session.id, Some("alice")).unwrap());
        assert!(events.is_empty());
        assert_eq!(view.status(), "Waiting for opponent...");

        manager
            .join(&session.id, "bob".to_string(), Some("Bob".to_string()))
            .unwrap();
        let events = view.apply(manager.state(&session.id, Some("alice")).unwrap());
        assert_eq!(
            events,
            vec![ViewEvent::OpponentJoined {
                name: "Bob".to_string()
            }]
        );

        let events = view.apply(manager.state(&session.id, Some("alice")).unwrap());
        assert!(events.is_empty());
        assert!(view.is_my_turn());
    }

    #[test]
    fn test_game_over_counted_once() {
        let (manager, id) = started();
        let mut view = ClientView::new("alice".to_string());
        view.apply(manager.state(&id, Some("alice")).unwrap());

        for (player, cell) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
            manager.make_move(&id, player, cell).unwrap();
        }

        let events = view.apply(manager.state(&id, Some("alice")).unwrap());
        assert!(events.contains(&ViewEvent::GameOver(Winner::X)));
        assert_eq!(view.score().wins(Mark::X), 1);
        assert_eq!(view.status(), "You win!");

        let events = view.apply(manager.state(&id, Some("alice")).unwrap());
        assert!(events.is_empty());
        assert_eq!(view.score().wins(Mark::X), 1);
    }

    #[test]
    fn test_rematch_flow_events() {
        let (manager, id) = started();
        let mut alice = ClientView::new("alice".to_string());
        let mut bob = ClientView::new("bob".to_string());
        manager.make_move(&id, "alice", 4).unwrap();
        alice.apply(manager.state(&id, Some("alice")).unwrap());
        bob.apply(manager.state(&id, Some("bob")).unwrap());

        manager.request_reset(&id, "alice").unwrap();
        let events = alice.apply(manager.state(&id, Some("alice")).unwrap());
        assert_eq!(events, vec![ViewEvent::AwaitingResetResponse]);
        let events = bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert_eq!(
            events,
            vec![ViewEvent::ResetRequested {
                by: "Alice".to_string()
            }]
        );
        assert!(bob.apply(manager.state(&id, Some("bob")).unwrap()).is_empty());

        manager.respond_reset(&id, "bob", true).unwrap();
        let events = alice.apply(manager.state(&id, Some("alice")).unwrap());
        assert_eq!(events, vec![ViewEvent::RoundRestarted]);
        assert!(alice.pending_reset().is_none());
    }

    #[test]
    fn test_rejection_seen_once() {
        let (manager, id) = started();
        let mut alice = ClientView::new("alice".to_string());
        manager.request_reset(&id, "alice").unwrap();
        alice.apply(manager.state(&id, Some("alice")).unwrap());

        manager.respond_reset(&id, "bob", false).unwrap();
        let events = alice.apply(manager.state(&id, Some("alice")).unwrap());
        assert_eq!(events, vec![ViewEvent::ResetRejected]);
        let events = alice.apply(manager.state(&id, Some("alice")).unwrap());
        assert!(events.is_empty());
    }

    #[test]
    fn test_next_round_counted_when_restart_missed() {
        let (manager, id) = started();
        let mut bob = ClientView::new("bob".to_string());
        for (player, cell) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
            manager.make_move(&id, player, cell).unwrap();
        }
        let events = bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert!(events.contains(&ViewEvent::GameOver(Winner::X)));

        // Rematch accepted and X moves before bob polls again.
        manager.request_reset(&id, "alice").unwrap();
        manager.respond_reset(&id, "bob", true).unwrap();
        let snapshot = manager.make_move(&id, "alice", 8).unwrap();
        let events = bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert_eq!(
            events,
            vec![
                ViewEvent::RoundRestarted,
                ViewEvent::BoardChanged(snapshot.board)
            ]
        );

        for (player, cell) in [("bob", 0), ("alice", 5), ("bob", 1), ("alice", 3), ("bob", 2)] {
            manager.make_move(&id, player, cell).unwrap();
        }
        let events = bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert!(events.contains(&ViewEvent::GameOver(Winner::O)));
        assert_eq!(bob.score().wins(Mark::O), 1);
        assert_eq!(bob.score().wins(Mark::X), 1);
    }

    #[test]
    fn test_board_changed_on_opponent_move() {
        let (manager, id) = started();
        let mut bob = ClientView::new("bob".to_string());
        bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert_eq!(bob.status(), "Opponent's turn (X)");

        let snapshot = manager.make_move(&id, "alice", 8).unwrap();
        let events = bob.apply(manager.state(&id, Some("bob")).unwrap());
        assert_eq!(events, vec![ViewEvent::BoardChanged(snapshot.board)]);
        assert!(bob.is_my_turn());
    }
}
