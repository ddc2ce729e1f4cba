//! Outbound calls to the chat platform's bot API.
//!
//! The bot API is a write-only sink from our side: we report scores and
//! acknowledge game callbacks, and relay whatever it answers.

use derive_more::{Display, Error};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Where a score should be attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreTarget {
    /// Message sent through inline mode.
    Inline {
        /// Inline message id.
        inline_message_id: String,
    },
    /// Regular chat message.
    Chat {
        /// Chat id.
        chat_id: String,
        /// Message id inside the chat.
        message_id: String,
    },
}

impl ScoreTarget {
    /// Picks the target from optional request fields. Inline ids take
    /// precedence; otherwise both chat and message ids are required.
    pub fn from_parts(
        inline_message_id: Option<String>,
        chat_id: Option<String>,
        message_id: Option<String>,
    ) -> Option<Self> {
        match (inline_message_id, chat_id, message_id) {
            (Some(inline_message_id), _, _) => Some(ScoreTarget::Inline { inline_message_id }),
            (None, Some(chat_id), Some(message_id)) => Some(ScoreTarget::Chat {
                chat_id,
                message_id,
            }),
            _ => None,
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ScoreTarget::Inline { inline_message_id } => {
                vec![("inline_message_id", inline_message_id.clone())]
            }
            ScoreTarget::Chat {
                chat_id,
                message_id,
            } => vec![
                ("chat_id", chat_id.clone()),
                ("message_id", message_id.clone()),
            ],
        }
    }
}

/// Builds the game URL handed back to the chat client when it opens the game.
/// Chat coordinates are appended only when the callback carried them.
///
/// # Errors
///
/// Returns [`BotError`] when `base_url` is not an absolute URL.
pub fn game_url(
    base_url: &str,
    user_id: &str,
    chat_id: Option<&str>,
    message_id: Option<&str>,
) -> Result<String, BotError> {
    let mut url = reqwest::Url::parse(base_url)
        .map_err(|e| BotError::invalid_url(format!("Invalid game URL '{}': {}", base_url, e)))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("user_id", user_id);
        if let Some(chat_id) = chat_id {
            query.append_pair("chat_id", chat_id);
        }
        if let Some(message_id) = message_id {
            query.append_pair("message_id", message_id);
        }
    }
    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    #[serde(default)]
    description: Option<String>,
}

/// Client for the bot API.
#[derive(Clone)]
pub struct BotClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl std::fmt::Debug for BotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotClient")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl BotClient {
    /// Creates a client for `token` against `api_url`.
    #[instrument(skip(token))]
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Reports `score` for `user_id`, overwriting lower or higher scores.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] on transport failure or a non-success reply.
    #[instrument(skip(self))]
    pub async fn set_game_score(
        &self,
        user_id: &str,
        score: u64,
        target: &ScoreTarget,
    ) -> Result<serde_json::Value, BotError> {
        let mut query = vec![
            ("user_id", user_id.to_string()),
            ("score", score.to_string()),
            ("force", "true".to_string()),
        ];
        query.extend(target.query());

        debug!("Sending setGameScore");
        let response = self
            .client
            .post(self.method_url("setGameScore"))
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                BotError::transport(format!(
                    "setGameScore request failed: {}",
                    e.without_url()
                ))
            })?;

        let reply = Self::read_reply(response).await?;
        info!(user_id, score, "Score reported");
        Ok(reply)
    }

    /// Answers a game callback query with the URL to open.
    ///
    /// # Errors
    ///
    /// Returns [`BotError`] on transport failure or a non-success reply.
    #[instrument(skip(self))]
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        url: &str,
    ) -> Result<serde_json::Value, BotError> {
        let body = serde_json::json!({
            "callback_query_id": callback_query_id,
            "url": url,
        });

        debug!("Sending answerCallbackQuery");
        let response = self
            .client
            .post(self.method_url("answerCallbackQuery"))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                BotError::transport(format!(
                    "answerCallbackQuery request failed: {}",
                    e.without_url()
                ))
            })?;

        let reply = Self::read_reply(response).await?;
        info!(callback_query_id, "Callback query answered");
        Ok(reply)
    }

    async fn read_reply(response: reqwest::Response) -> Result<serde_json::Value, BotError> {
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                BotError::transport(format!("Unreadable bot API reply: {}", e.without_url()))
            })?;

        if !status.is_success() {
            let description = serde_json::from_value::<ApiReply>(body.clone())
                .ok()
                .and_then(|r| r.description)
                .unwrap_or_else(|| "Telegram API error".to_string());
            return Err(BotError::rejected(status.as_u16(), description));
        }
        Ok(body)
    }
}

/// Bot API failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Bot API error: {} at {}:{}", message, file, line)]
pub struct BotError {
    /// Error message.
    pub message: String,
    /// HTTP status returned by the bot API, when it answered at all.
    pub status: Option<u16>,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BotError {
    /// Network or decoding failure.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn transport(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Bot API transport error");
        Self {
            message,
            status: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Malformed URL built from configuration.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn invalid_url(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Invalid bot URL");
        Self {
            message,
            status: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The bot API answered with a failure status.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn rejected(status: u16, message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(status, error_message = %message, "Bot API rejected request");
        Self {
            message,
            status: Some(status),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_prefers_inline() {
        let target = ScoreTarget::from_parts(
            Some("inl".to_string()),
            Some("1".to_string()),
            Some("2".to_string()),
        );
        assert_eq!(
            target,
            Some(ScoreTarget::Inline {
                inline_message_id: "inl".to_string()
            })
        );
    }

    #[test]
    fn test_target_needs_chat_and_message() {
        assert_eq!(
            ScoreTarget::from_parts(None, Some("1".to_string()), None),
            None
        );
        assert_eq!(
            ScoreTarget::from_parts(None, Some("1".to_string()), Some("2".to_string())),
            Some(ScoreTarget::Chat {
                chat_id: "1".to_string(),
                message_id: "2".to_string()
            })
        );
    }

    #[test]
    fn test_method_url() {
        let client = BotClient::new("https://api.example/".to_string(), "123:abc".to_string());
        assert_eq!(
            client.method_url("setGameScore"),
            "https://api.example/bot123:abc/setGameScore"
        );
    }

    #[test]
    fn test_game_url() {
        assert_eq!(
            game_url("https://play.example", "7", Some("8"), Some("9")).unwrap(),
            "https://play.example/?user_id=7&chat_id=8&message_id=9"
        );
        assert_eq!(
            game_url("https://play.example", "7", None, None).unwrap(),
            "https://play.example/?user_id=7"
        );
    }

    #[test]
    fn test_game_url_encodes_values() {
        let url = game_url("https://play.example/app", "a&b=c", Some("-100 200"), None).unwrap();
        assert_eq!(
            url,
            "https://play.example/app?user_id=a%26b%3Dc&chat_id=-100+200"
        );
    }

    #[test]
    fn test_game_url_rejects_relative_base() {
        assert!(game_url("not a url", "7", None, None).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let client = BotClient::new("https://api.example".to_string(), "123:SECRET".to_string());
        let printed = format!("{:?}", client);
        assert!(!printed.contains("SECRET"));
        assert!(printed.contains("api.example"));
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        // Nothing listens on port 1.
        let client = BotClient::new("http://127.0.0.1:1".to_string(), "123:SECRET".to_string());
        let target = ScoreTarget::Inline {
            inline_message_id: "inl".to_string(),
        };
        let err = client.set_game_score("7", 3, &target).await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(!err.message.contains("SECRET"));
        assert!(!err.to_string().contains("SECRET"));
    }
}
