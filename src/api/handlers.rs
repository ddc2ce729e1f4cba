//! Route handlers.

use super::AppState;
use super::dto::{
    BotResponse, CreateGameRequest, CreateGameResponse, GameCallbackRequest, GameStateQuery,
    HealthResponse, JoinGameRequest, MakeMoveRequest, ResetGameRequest, SessionResponse,
    SetGameScoreRequest,
};
use super::error::ApiError;
use crate::bot::{ScoreTarget, game_url};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

/// Treats empty strings the same as absent fields.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Tic-tac-toe duel server",
        "status": "running",
    }))
}

/// `GET /health`
#[instrument(skip_all)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let games_count = state.sessions.session_count()?;
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        games_count,
    }))
}

/// `GET /ping`
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/createGame`
#[instrument(skip_all)]
pub async fn create_game(
    State(state): State<AppState>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let request = body(payload)?;
    let user_id = present(request.user_id).ok_or_else(|| ApiError::missing("userId is required"))?;

    let session = state.sessions.create(user_id, present(request.user_name))?;
    let invite_link = state.invite_link(&session.id);
    info!(session_id = %session.id, "Invite link issued");

    Ok(Json(CreateGameResponse {
        success: true,
        game_id: session.id,
        invite_link,
    }))
}

/// `POST /api/joinGame`
#[instrument(skip_all)]
pub async fn join_game(
    State(state): State<AppState>,
    payload: Result<Json<JoinGameRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = body(payload)?;
    let (Some(game_id), Some(user_id)) = (present(request.game_id), present(request.user_id))
    else {
        return Err(ApiError::missing("gameId and userId are required"));
    };

    let snapshot = state
        .sessions
        .join(&game_id, user_id, present(request.user_name))?;
    Ok(Json(snapshot.into()))
}

/// `GET /api/getGameState`
#[instrument(skip_all)]
pub async fn get_game_state(
    State(state): State<AppState>,
    query: Result<Query<GameStateQuery>, QueryRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let game_id = present(query.game_id).ok_or_else(|| ApiError::missing("gameId is required"))?;
    let user_id = present(query.user_id);

    debug!(session_id = %game_id, "State poll");
    let snapshot = state.sessions.state(&game_id, user_id.as_deref())?;
    Ok(Json(snapshot.into()))
}

/// `POST /api/makeMove`
#[instrument(skip_all)]
pub async fn make_move(
    State(state): State<AppState>,
    payload: Result<Json<MakeMoveRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = body(payload)?;
    let (Some(game_id), Some(user_id), Some(cell_index)) = (
        present(request.game_id),
        present(request.user_id),
        request.cell_index,
    ) else {
        return Err(ApiError::missing(
            "gameId, userId, and cellIndex are required",
        ));
    };
    let cell = usize::try_from(cell_index)
        .map_err(|_| ApiError::missing("cellIndex must be between 0 and 8"))?;

    let snapshot = state.sessions.make_move(&game_id, &user_id, cell)?;
    Ok(Json(snapshot.into()))
}

/// `POST /api/resetGame`
#[instrument(skip_all)]
pub async fn reset_game(
    State(state): State<AppState>,
    payload: Result<Json<ResetGameRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let request = body(payload)?;
    let (Some(game_id), Some(user_id), Some(action)) = (
        present(request.game_id),
        present(request.user_id),
        present(request.action),
    ) else {
        return Err(ApiError::missing("gameId, userId, and action are required"));
    };

    let snapshot = state.sessions.reset(&game_id, &user_id, &action)?;
    Ok(Json(snapshot.into()))
}

/// `POST /api/setGameScore`
#[instrument(skip_all)]
pub async fn set_game_score(
    State(state): State<AppState>,
    payload: Result<Json<SetGameScoreRequest>, JsonRejection>,
) -> Result<Json<BotResponse>, ApiError> {
    let request = body(payload)?;
    let (Some(user_id), Some(score)) = (present(request.user_id), request.score.filter(|s| *s > 0))
    else {
        return Err(ApiError::missing("Missing required parameters"));
    };
    let bot = state.bot.as_ref().ok_or(ApiError::Misconfigured)?;
    let target = ScoreTarget::from_parts(
        present(request.inline_message_id),
        present(request.chat_id),
        present(request.message_id),
    )
    .ok_or_else(|| ApiError::missing("Either chat_id+message_id or inline_message_id required"))?;

    let data = bot.set_game_score(&user_id, score, &target).await?;
    Ok(Json(BotResponse {
        success: true,
        data,
    }))
}

/// `POST /api/gameCallback`
#[instrument(skip_all)]
pub async fn game_callback(
    State(state): State<AppState>,
    payload: Result<Json<GameCallbackRequest>, JsonRejection>,
) -> Result<Json<BotResponse>, ApiError> {
    let request = body(payload)
        .map_err(|_| ApiError::missing("Invalid callback query"))?;
    let query = request
        .callback_query
        .ok_or_else(|| ApiError::missing("Invalid callback query"))?;
    let user_id = present(query.from.id).ok_or_else(|| ApiError::missing("Invalid callback query"))?;
    let game_short_name = present(query.game_short_name)
        .ok_or_else(|| ApiError::missing("Invalid callback query"))?;
    let bot = state.bot.as_ref().ok_or(ApiError::Misconfigured)?;

    let (chat_id, message_id) = match query.message {
        Some(message) => (message.chat.and_then(|c| c.id), message.message_id),
        None => (None, None),
    };
    let url = game_url(
        state.config.invite_base_url(),
        &user_id,
        chat_id.as_deref(),
        message_id.as_deref(),
    )?;
    debug!(game = %game_short_name, "Answering game callback");

    let data = bot.answer_callback_query(&query.id, &url).await?;
    Ok(Json(BotResponse {
        success: true,
        data,
    }))
}
