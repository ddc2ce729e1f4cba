//! Request and response bodies for the HTTP API.

use crate::session::{SessionId, SessionSnapshot};
use serde::{Deserialize, Deserializer, Serialize};

/// Accepts an identifier sent either as a JSON string or a JSON number.
///
/// Chat platforms hand out numeric user and chat ids; mini-app clients pass
/// them through unchanged.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

/// `POST /api/createGame`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    /// Creator's id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    /// Creator's display name.
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `POST /api/joinGame`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinGameRequest {
    /// Session to join.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Joiner's id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    /// Joiner's display name.
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `GET /api/getGameState` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateQuery {
    /// Session to read.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Polling player, checked against the seats when present.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// `POST /api/makeMove`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeMoveRequest {
    /// Session to play in.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Moving player.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    /// Target cell (0-8).
    #[serde(default)]
    pub cell_index: Option<i64>,
}

/// `POST /api/resetGame`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetGameRequest {
    /// Session to reset.
    #[serde(default)]
    pub game_id: Option<String>,
    /// Acting player.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    /// `request`, `accept` or `reject`.
    #[serde(default)]
    pub action: Option<String>,
}

/// `POST /api/setGameScore`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGameScoreRequest {
    /// Player whose score is reported.
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
    /// Chat holding the game message.
    #[serde(default, deserialize_with = "lenient_id")]
    pub chat_id: Option<String>,
    /// Game message inside the chat.
    #[serde(default, deserialize_with = "lenient_id")]
    pub message_id: Option<String>,
    /// Inline game message.
    #[serde(default)]
    pub inline_message_id: Option<String>,
    /// Score to report.
    #[serde(default)]
    pub score: Option<u64>,
}

/// User that pressed the game button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackUser {
    /// Platform user id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
}

/// Chat a callback message lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackChat {
    /// Platform chat id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
}

/// Message carrying the game button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackMessage {
    /// Chat of the message.
    #[serde(default)]
    pub chat: Option<CallbackChat>,
    /// Message id.
    #[serde(default, deserialize_with = "lenient_id")]
    pub message_id: Option<String>,
}

/// Callback query pushed by the chat platform when the game is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Query id to answer.
    pub id: String,
    /// Who pressed the button.
    pub from: CallbackUser,
    /// Message with the button, absent for inline games.
    #[serde(default)]
    pub message: Option<CallbackMessage>,
    /// Short name of the requested game.
    #[serde(default)]
    pub game_short_name: Option<String>,
}

/// `POST /api/gameCallback`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameCallbackRequest {
    /// The pushed query.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// Reply to a successful create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    /// Always true.
    pub success: bool,
    /// New session id.
    pub game_id: SessionId,
    /// Link the creator forwards to the opponent.
    pub invite_link: String,
}

/// Reply carrying a session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Always true.
    pub success: bool,
    /// Current state.
    pub game_session: SessionSnapshot,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(game_session: SessionSnapshot) -> Self {
        Self {
            success: true,
            game_session,
        }
    }
}

/// Reply relaying the bot API's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    /// Always true.
    pub success: bool,
    /// Bot API body.
    pub data: serde_json::Value,
}

/// Failure reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy`.
    pub status: String,
    /// Live sessions.
    pub games_count: usize,
}
