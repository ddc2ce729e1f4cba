//! Game session management for server-mediated play.

mod error;
mod manager;
mod model;
mod moves;
mod store;

pub use error::{ErrorKind, SessionError};
pub use manager::{DEFAULT_RETENTION_SECS, SessionManager};
pub use model::{
    GameSession, LastMove, PendingReset, PlayerId, PlayerSlot, ResetAction, ResetStatus,
    SessionId, SessionSnapshot,
};
pub use store::{MemorySessionStore, SessionStore};
