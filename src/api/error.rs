//! Mapping from domain failures to HTTP responses.

use super::dto::ErrorResponse;
use crate::bot::BotError;
use crate::session::{ErrorKind, SessionError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

/// Failure of an API call.
#[derive(Debug, derive_more::Display)]
pub enum ApiError {
    /// Missing or malformed request field.
    #[display("{}", _0)]
    BadRequest(String),

    /// Session operation refused.
    #[display("{}", _0)]
    Session(SessionError),

    /// Bot API call failed.
    #[display("{}", _0)]
    Bot(BotError),

    /// Score reporting requested but no bot token configured.
    #[display("Server configuration error")]
    Misconfigured,
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Missing required fields.
    pub fn missing(message: &str) -> Self {
        ApiError::BadRequest(message.to_string())
    }

    /// Status code and client-facing message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Session(err) => {
                let status = match err.kind() {
                    ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err.kind() {
                    ErrorKind::Internal => "Internal server error".to_string(),
                    _ => err.to_string(),
                };
                (status, message)
            }
            ApiError::Bot(err) => match err.status.and_then(|s| StatusCode::from_u16(s).ok()) {
                Some(status) => (status, err.message.clone()),
                None => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                ),
            },
            ApiError::Misconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Session(err)
    }
}

impl From<BotError> for ApiError {
    fn from(err: BotError) -> Self {
        ApiError::Bot(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, status = %status, "Request failed");
        } else {
            warn!(error = %self, status = %status, "Request rejected");
        }
        let body = ErrorResponse {
            success: false,
            error: message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ResetAction;

    #[test]
    fn test_session_kinds_map_to_status() {
        let cases = [
            (SessionError::NotFound("g".to_string()), StatusCode::NOT_FOUND),
            (SessionError::NotAPlayer, StatusCode::FORBIDDEN),
            (SessionError::NotYourTurn, StatusCode::BAD_REQUEST),
            (
                SessionError::NoPendingReset(ResetAction::Accept),
                StatusCode::BAD_REQUEST,
            ),
            (
                SessionError::Store("poisoned".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let (status, _) = ApiError::from(err).status_and_message();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_store_failure_hides_details() {
        let (_, message) =
            ApiError::from(SessionError::Store("lock poisoned".to_string())).status_and_message();
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_bot_rejection_mirrors_status() {
        let err = BotError::rejected(401, "Unauthorized".to_string());
        let (status, message) = ApiError::from(err).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Unauthorized");
    }

    #[test]
    fn test_bot_transport_is_internal() {
        let err = BotError::transport("connection refused".to_string());
        let (status, _) = ApiError::from(err).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
