//! Session storage.

use super::error::SessionError;
use super::model::{GameSession, SessionId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, instrument};

/// Key-value storage for sessions.
///
/// Implementations only promise per-call atomicity: a `get` followed by a
/// `put` of the same session is not serialised against other callers, and the
/// last `put` wins.
pub trait SessionStore: Send + Sync + Debug {
    /// Fetches a copy of a session.
    fn get(&self, id: &str) -> Result<Option<GameSession>, SessionError>;

    /// Inserts or overwrites a session.
    fn put(&self, session: GameSession) -> Result<(), SessionError>;

    /// Removes every session created strictly before `cutoff`, returning how
    /// many were dropped.
    fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, SessionError>;

    /// Number of stored sessions.
    fn len(&self) -> Result<usize, SessionError>;

    /// Whether the store holds no sessions.
    fn is_empty(&self) -> Result<bool, SessionError> {
        Ok(self.len()? == 0)
    }
}

/// Process-local store backed by a mutex-guarded map.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, GameSession>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory session store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<SessionId, GameSession>>, SessionError> {
        self.sessions.lock().map_err(|e| {
            error!(error = %e, "Session map lock poisoned");
            SessionError::Store("session map lock poisoned".to_string())
        })
    }
}

impl SessionStore for MemorySessionStore {
    #[instrument(skip(self))]
    fn get(&self, id: &str) -> Result<Option<GameSession>, SessionError> {
        let session = self.lock()?.get(id).cloned();
        if session.is_none() {
            debug!(session_id = id, "Session not found");
        }
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id))]
    fn put(&self, session: GameSession) -> Result<(), SessionError> {
        self.lock()?.insert(session.id.clone(), session);
        debug!("Session stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Swept stale sessions");
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    fn len(&self) -> Result<usize, SessionError> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Mark;
    use crate::session::model::PlayerSlot;
    use chrono::Duration;

    fn session(id: &str, created_at: DateTime<Utc>) -> GameSession {
        GameSession::new(
            id.to_string(),
            PlayerSlot::new("p1".to_string(), "Ann".to_string(), Mark::X),
            created_at,
        )
    }

    #[test]
    fn test_put_is_idempotent_overwrite() {
        let store = MemorySessionStore::new();
        let mut s = session("g1", Utc::now());
        store.put(s.clone()).unwrap();
        s.active = true;
        store.put(s.clone()).unwrap();
        store.put(s.clone()).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("g1").unwrap(), Some(s));
    }

    #[test]
    fn test_get_missing() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_sweep_removes_only_old_sessions() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        store.put(session("old", now - Duration::hours(2))).unwrap();
        store.put(session("fresh", now)).unwrap();

        let removed = store.sweep_older_than(now - Duration::hours(1)).unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("old").unwrap().is_none());
        assert!(store.get("fresh").unwrap().is_some());
    }

    #[test]
    fn test_clones_share_storage() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.put(session("g1", Utc::now())).unwrap();
        assert!(other.get("g1").unwrap().is_some());
    }
}
