//! Client seam over the session server's HTTP API.

use crate::api::{
    CreateGameRequest, CreateGameResponse, ErrorResponse, JoinGameRequest, MakeMoveRequest,
    ResetGameRequest, SessionResponse,
};
use crate::session::{ResetAction, SessionSnapshot};
use derive_more::{Display, Error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

/// Operations a client performs against a session server.
#[async_trait::async_trait]
pub trait SessionApi: Send + Sync {
    /// Creates a session seated as X.
    async fn create(
        &self,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<CreateGameResponse, ClientError>;

    /// Joins a session as O.
    async fn join(
        &self,
        game_id: &str,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<SessionSnapshot, ClientError>;

    /// Fetches the current snapshot.
    async fn state(
        &self,
        game_id: &str,
        user_id: Option<&str>,
    ) -> Result<SessionSnapshot, ClientError>;

    /// Plays a cell.
    async fn make_move(
        &self,
        game_id: &str,
        user_id: &str,
        cell: usize,
    ) -> Result<SessionSnapshot, ClientError>;

    /// Sends a rematch handshake step.
    async fn reset(
        &self,
        game_id: &str,
        user_id: &str,
        action: ResetAction,
    ) -> Result<SessionSnapshot, ClientError>;
}

/// [`SessionApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestSessionClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestSessionClient {
    /// Creates a client for the server at `base_url`.
    #[instrument]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Server root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("POST {} failed: {}", path, e)))?;
        Self::decode(path, response).await
    }

    async fn decode<R>(path: &str, response: reqwest::Response) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::transport(format!("Reading {} reply failed: {}", path, e)))?;
        debug!(path, status = %status, "Server replied");

        if !status.is_success() {
            let reason = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("HTTP {}", status));
            warn!(path, status = %status, reason = %reason, "Server rejected request");
            return Err(ClientError::rejected(status.as_u16(), reason));
        }

        serde_json::from_str(&text)
            .map_err(|e| ClientError::transport(format!("Unreadable {} reply: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl SessionApi for RestSessionClient {
    #[instrument(skip(self))]
    async fn create(
        &self,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<CreateGameResponse, ClientError> {
        let request = CreateGameRequest {
            user_id: Some(user_id.to_string()),
            user_name: user_name.map(str::to_string),
        };
        let created: CreateGameResponse = self.post("/api/createGame", &request).await?;
        info!(game_id = %created.game_id, "Created session");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn join(
        &self,
        game_id: &str,
        user_id: &str,
        user_name: Option<&str>,
    ) -> Result<SessionSnapshot, ClientError> {
        let request = JoinGameRequest {
            game_id: Some(game_id.to_string()),
            user_id: Some(user_id.to_string()),
            user_name: user_name.map(str::to_string),
        };
        let reply: SessionResponse = self.post("/api/joinGame", &request).await?;
        info!(game_id, "Joined session");
        Ok(reply.game_session)
    }

    #[instrument(skip(self))]
    async fn state(
        &self,
        game_id: &str,
        user_id: Option<&str>,
    ) -> Result<SessionSnapshot, ClientError> {
        let path = "/api/getGameState";
        let mut query = vec![("gameId", game_id)];
        if let Some(user_id) = user_id {
            query.push(("userId", user_id));
        }
        let response = self
            .client
            .get(self.url(path))
            .query(&query)
            .send()
            .await
            .map_err(|e| ClientError::transport(format!("GET {} failed: {}", path, e)))?;
        let reply: SessionResponse = Self::decode(path, response).await?;
        Ok(reply.game_session)
    }

    #[instrument(skip(self))]
    async fn make_move(
        &self,
        game_id: &str,
        user_id: &str,
        cell: usize,
    ) -> Result<SessionSnapshot, ClientError> {
        let request = MakeMoveRequest {
            game_id: Some(game_id.to_string()),
            user_id: Some(user_id.to_string()),
            cell_index: i64::try_from(cell).ok(),
        };
        let reply: SessionResponse = self.post("/api/makeMove", &request).await?;
        Ok(reply.game_session)
    }

    #[instrument(skip(self))]
    async fn reset(
        &self,
        game_id: &str,
        user_id: &str,
        action: ResetAction,
    ) -> Result<SessionSnapshot, ClientError> {
        let request = ResetGameRequest {
            game_id: Some(game_id.to_string()),
            user_id: Some(user_id.to_string()),
            action: Some(action.to_string()),
        };
        let reply: SessionResponse = self.post("/api/resetGame", &request).await?;
        Ok(reply.game_session)
    }
}

/// Client-side failure talking to the server.
#[derive(Debug, Clone, Display, Error)]
#[display("Client error: {} at {}:{}", message, file, line)]
pub struct ClientError {
    /// Error message; the server's reason when it answered.
    pub message: String,
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ClientError {
    /// Network or decoding failure.
    #[track_caller]
    pub fn transport(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            status: None,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// The server refused the request.
    #[track_caller]
    pub fn rejected(status: u16, message: String) -> Self {
        let loc = std::panic::Location::caller();
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
    fn test_base_url_trimmed() {
        let client = RestSessionClient::new("http://localhost:8000/".to_string());
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/api/makeMove"),
            "http://localhost:8000/api/makeMove"
        );
    }

    #[test]
    fn test_rejected_keeps_status() {
        let err = ClientError::rejected(403, "You are not a player in this game".to_string());
        assert_eq!(err.status, Some(403));
        assert!(err.to_string().contains("not a player"));
    }
}
