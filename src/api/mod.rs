//! HTTP API consumed by the mini-app front end.
//!
//! Every response is JSON. Successful calls carry `"success": true` plus
//! their payload; failures carry `"success": false` and an `error` reason,
//! with the status code picked from the failure category.

mod dto;
mod error;
mod handlers;

pub use dto::{
    BotResponse, CallbackChat, CallbackMessage, CallbackQuery, CallbackUser, CreateGameRequest,
    CreateGameResponse, ErrorResponse, GameCallbackRequest, GameStateQuery, HealthResponse,
    JoinGameRequest, MakeMoveRequest, ResetGameRequest, SessionResponse, SetGameScoreRequest,
};
pub use error::ApiError;

use crate::bot::BotClient;
use crate::config::ServerConfig;
use crate::session::SessionManager;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session lifecycle and move dispatch.
    pub sessions: SessionManager,
    /// Server settings.
    pub config: Arc<ServerConfig>,
    /// Bot API sink, present when a token is configured.
    pub bot: Option<BotClient>,
}

impl AppState {
    /// Builds handler state, wiring a bot client when the config carries a token.
    #[instrument(skip_all)]
    pub fn new(sessions: SessionManager, config: ServerConfig) -> Self {
        let bot = config
            .bot_token()
            .as_ref()
            .map(|token| BotClient::new(config.bot_api_url().clone(), token.clone()));
        if bot.is_none() {
            info!("No bot token configured, score reporting disabled");
        }
        Self {
            sessions,
            config: Arc::new(config),
            bot,
        }
    }

    /// Link the creator forwards so the opponent lands on the join screen.
    pub fn invite_link(&self, session_id: &str) -> String {
        format!(
            "{}/?gameId={}&player=2",
            self.config.invite_base_url().trim_end_matches('/'),
            session_id
        )
    }
}

fn log_request(req: Request<Body>) -> Request<Body> {
    info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
    req
}

/// Cross-origin policy: the mini-app front end is hosted apart from the API.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/ping", get(handlers::ping))
        .route("/api/createGame", post(handlers::create_game))
        .route("/api/joinGame", post(handlers::join_game))
        .route("/api/getGameState", get(handlers::get_game_state))
        .route("/api/makeMove", post(handlers::make_move))
        .route("/api/resetGame", post(handlers::reset_game))
        .route("/api/setGameScore", post(handlers::set_game_score))
        .route("/api/gameCallback", post(handlers::game_callback))
        .layer(ServiceBuilder::new().map_request(log_request as fn(Request<Body>) -> Request<Body>))
        .layer(cors())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_link_format() {
        let config = ServerConfig::default().with_invite_base_url("https://play.example/");
        let state = AppState::new(SessionManager::in_memory(), config);
        assert_eq!(
            state.invite_link("game_0123456789ab"),
            "https://play.example/?gameId=game_0123456789ab&player=2"
        );
    }

    #[test]
    fn test_bot_wired_from_token() {
        let without = AppState::new(SessionManager::in_memory(), ServerConfig::default());
        assert!(without.bot.is_none());

        let with = AppState::new(
            SessionManager::in_memory(),
            ServerConfig::default().with_bot_token("123:abc"),
        );
        assert!(with.bot.is_some());
    }
}
