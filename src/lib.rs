//! tictac_duel library - two-player tic-tac-toe sessions for chat mini-apps
//!
//! A small HTTP server keeps authoritative game sessions in memory; clients
//! poll it for state and post moves.
//!
//! # Architecture
//!
//! - **Games**: Tic-tac-toe rules engine (placement, win and draw detection)
//! - **Session**: Session store, lifecycle (create, join, rematch) and move dispatch
//! - **Api**: axum router exposing sessions as JSON over HTTP
//! - **Bot**: Score reporting and game callbacks against the chat bot API
//! - **Client**: REST client, view reconciliation and state polling
//!
//! # Example
//!
//! ```
//! use tictac_duel::{SessionManager, Winner};
//!
//! let sessions = SessionManager::in_memory();
//! let session = sessions.create("alice".to_string(), None).unwrap();
//! sessions.join(&session.id, "bob".to_string(), None).unwrap();
//!
//! for (player, cell) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
//!     sessions.make_move(&session.id, player, cell).unwrap();
//! }
//!
//! let snapshot = sessions.state(&session.id, None).unwrap();
//! assert_eq!(snapshot.winner, Some(Winner::X));
//! assert!(!snapshot.game_active);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod bot;
mod client;
mod config;
mod games;
mod session;

// Crate-level exports - HTTP API
pub use api::{
    ApiError, AppState, BotResponse, CallbackChat, CallbackMessage, CallbackQuery, CallbackUser,
    CreateGameRequest, CreateGameResponse, ErrorResponse, GameCallbackRequest, GameStateQuery,
    HealthResponse, JoinGameRequest, MakeMoveRequest, ResetGameRequest, SessionResponse,
    SetGameScoreRequest, router,
};

// Crate-level exports - Bot API sink
pub use bot::{BotClient, BotError, ScoreTarget, game_url};

// Crate-level exports - Client
pub use client::{ClientError, ClientView, Poller, RestSessionClient, SessionApi, ViewEvent};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Session management
pub use session::{
    DEFAULT_RETENTION_SECS, ErrorKind, GameSession, LastMove, MemorySessionStore, PendingReset,
    PlayerId, PlayerSlot, ResetAction, ResetStatus, SessionError, SessionId, SessionManager,
    SessionSnapshot, SessionStore,
};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, CELL_COUNT, Cell, LINES, LocalGame, LocalOutcome, Mark, RuleError, Score, Winner,
    apply_move, check_winner, is_draw, is_full, winner, winning_line,
};
