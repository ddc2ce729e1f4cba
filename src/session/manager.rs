//! Session lifecycle: create, join, state polling and the rematch handshake.

use super::error::SessionError;
use super::model::{
    GameSession, PendingReset, PlayerId, PlayerSlot, ResetAction, ResetStatus, SessionId,
    SessionSnapshot,
};
use super::store::{MemorySessionStore, SessionStore};
use crate::games::tictactoe::Mark;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How long a session lives, in seconds, before the next create may sweep it.
pub const DEFAULT_RETENTION_SECS: i64 = 3600;

/// Entry point for every session operation.
///
/// Each operation reads the session from the store, computes the new value and
/// writes it back. The store is never locked across that sequence, so two
/// concurrent writers to one session resolve last-write-wins.
#[derive(Debug, Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    retention: Duration,
}

impl SessionManager {
    /// Creates a manager over the given store.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn SessionStore>, retention: Duration) -> Self {
        info!(retention_secs = retention.num_seconds(), "Creating session manager");
        Self { store, retention }
    }

    /// Creates a manager over a fresh in-memory store with the default
    /// one-hour retention.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemorySessionStore::new()),
            Duration::seconds(DEFAULT_RETENTION_SECS),
        )
    }

    /// Number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails.
    pub fn session_count(&self) -> Result<usize, SessionError> {
        self.store.len()
    }

    pub(super) fn load(&self, session_id: &str) -> Result<GameSession, SessionError> {
        self.store
            .get(session_id)?
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub(super) fn save(&self, session: GameSession) -> Result<(), SessionError> {
        self.store.put(session)
    }

    fn fresh_id(&self) -> Result<SessionId, SessionError> {
        loop {
            let hex = Uuid::new_v4().simple().to_string();
            let id = format!("game_{}", &hex[..12]);
            if self.store.get(&id)?.is_none() {
                return Ok(id);
            }
            debug!(session_id = %id, "Generated id already in use, retrying");
        }
    }

    /// Creates a session with the caller seated as X.
    ///
    /// Sweeps sessions older than the retention window first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails.
    #[instrument(skip(self, player1_name))]
    pub fn create(
        &self,
        player1_id: PlayerId,
        player1_name: Option<String>,
    ) -> Result<GameSession, SessionError> {
        let now = Utc::now();
        match now.checked_sub_signed(self.retention) {
            Some(cutoff) => {
                self.store.sweep_older_than(cutoff)?;
            }
            None => warn!(retention = %self.retention, "Retention outside date range, sweep skipped"),
        }

        let id = self.fresh_id()?;
        let player1 = PlayerSlot::named_or_default(player1_id, player1_name, Mark::X);
        let session = GameSession::new(id, player1, now);
        self.save(session.clone())?;

        info!(session_id = %session.id, player_id = %session.player1.user_id, "Session created");
        Ok(session)
    }

    /// Seats the caller as O and starts the game.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`], [`SessionError::AlreadyFull`] or
    /// [`SessionError::SelfJoin`].
    #[instrument(skip(self, player2_name))]
    pub fn join(
        &self,
        session_id: &str,
        player2_id: PlayerId,
        player2_name: Option<String>,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.load(session_id)?;

        if session.player2.is_some() {
            warn!(session_id, "Join rejected: session full");
            return Err(SessionError::AlreadyFull);
        }
        if session.player1.user_id == player2_id {
            warn!(session_id, "Join rejected: creator joining own session");
            return Err(SessionError::SelfJoin);
        }

        session.player2 = Some(PlayerSlot::named_or_default(
            player2_id,
            player2_name,
            Mark::O,
        ));
        session.active = true;
        session.current_player = Mark::X;
        self.save(session.clone())?;

        info!(session_id, "Second player joined, game active");
        Ok(session.snapshot())
    }

    /// Returns the session as the given requester should see it.
    ///
    /// A requester id, when present, must belong to one of the players. When
    /// the requester authored a reset request that was rejected, the returned
    /// snapshot still shows the rejection and the stored copy is cleared, so
    /// the rejection is delivered exactly once.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] or [`SessionError::NotAPlayer`].
    #[instrument(skip(self))]
    pub fn state(
        &self,
        session_id: &str,
        requester_id: Option<&str>,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.load(session_id)?;

        let Some(requester_id) = requester_id else {
            return Ok(session.snapshot());
        };
        if !session.is_player(requester_id) {
            warn!(session_id, requester_id, "State requested by non-player");
            return Err(SessionError::NotAPlayer);
        }

        let snapshot = session.snapshot();
        let rejection_seen = session.pending_reset.as_ref().is_some_and(|pending| {
            pending.status == ResetStatus::Rejected && pending.by == requester_id
        });
        if rejection_seen {
            debug!(session_id, "Requester observed rejection, clearing pending reset");
            session.pending_reset = None;
            self.save(session)?;
        }
        Ok(snapshot)
    }

    /// Dispatches one rematch handshake step.
    ///
    /// `action` is matched case-insensitively against `request`, `accept` and
    /// `reject`.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownResetAction`] plus whatever the step returns.
    #[instrument(skip(self))]
    pub fn reset(
        &self,
        session_id: &str,
        player_id: &str,
        action: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let action: ResetAction = action.trim().parse().map_err(|_| {
            warn!(session_id, action, "Unknown reset action");
            SessionError::UnknownResetAction(action.to_string())
        })?;

        match action {
            ResetAction::Request => self.request_reset(session_id, player_id),
            ResetAction::Accept => self.respond_reset(session_id, player_id, true),
            ResetAction::Reject => self.respond_reset(session_id, player_id, false),
        }
    }

    /// Asks the opponent for a new round.
    ///
    /// Replaces any request already pending.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`] or [`SessionError::NotAPlayer`].
    #[instrument(skip(self))]
    pub fn request_reset(
        &self,
        session_id: &str,
        requester_id: &str,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut session = self.load(session_id)?;
        if !session.is_player(requester_id) {
            warn!(session_id, requester_id, "Reset requested by non-player");
            return Err(SessionError::NotAPlayer);
        }

        if let Some(previous) = &session.pending_reset {
            debug!(session_id, previous_by = %previous.by, previous_status = %previous.status, "Overwriting pending reset");
        }
        session.pending_reset = Some(PendingReset {
            by: requester_id.to_string(),
            status: ResetStatus::Requested,
            at: Utc::now(),
            rejected_by: None,
        });
        self.save(session.clone())?;

        info!(session_id, requester_id, "New round requested");
        Ok(session.snapshot())
    }

    /// Answers the opponent's request.
    ///
    /// Accepting restarts the round. Rejecting leaves the board alone and marks
    /// the request rejected until the requester polls.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFound`], [`SessionError::NotAPlayer`],
    /// [`SessionError::NoPendingReset`] or [`SessionError::OwnResetRequest`].
    #[instrument(skip(self))]
    pub fn respond_reset(
        &self,
        session_id: &str,
        responder_id: &str,
        accept: bool,
    ) -> Result<SessionSnapshot, SessionError> {
        let action = if accept {
            ResetAction::Accept
        } else {
            ResetAction::Reject
        };

        let mut session = self.load(session_id)?;
        if !session.is_player(responder_id) {
            warn!(session_id, responder_id, "Reset answered by non-player");
            return Err(SessionError::NotAPlayer);
        }

        let pending = match &session.pending_reset {
            Some(pending) if pending.status == ResetStatus::Requested => pending.clone(),
            _ => {
                warn!(session_id, %action, "No reset request outstanding");
                return Err(SessionError::NoPendingReset(action));
            }
        };
        if pending.by == responder_id {
            warn!(session_id, %action, "Player answered own reset request");
            return Err(SessionError::OwnResetRequest(action));
        }

        if accept {
            session.restart_round();
            info!(session_id, "Reset accepted, new round started");
        } else {
            session.pending_reset = Some(PendingReset {
                status: ResetStatus::Rejected,
                rejected_by: Some(responder_id.to_string()),
                ..pending
            });
            info!(session_id, "Reset rejected");
        }
        self.save(session.clone())?;
        Ok(session.snapshot())
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::in_memory()
    }
}
