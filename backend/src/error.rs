//! Error types and error handling for the gateway
//!
//! This module defines the error taxonomy shared by both client surfaces.
//! `AppError` implements `IntoResponse` so the ad-hoc surface can return it
//! directly from handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures talking to the upstream completion provider
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Provider answered with a non-success HTTP status
    #[error("Upstream API error: {status}: {body}")]
    Status {
        /// HTTP status code returned by the provider
        status: u16,
        /// Raw error body (may be empty)
        body: String,
    },

    /// The call could not be completed (connect, send, or read failure)
    #[error("Upstream API call failed: {0}")]
    Transport(String),

    /// Provider answered 2xx but the body was not the expected JSON
    #[error("Upstream API returned a malformed body: {0}")]
    MalformedBody(String),

    /// Provider answered with no choices, or a first choice without content
    #[error("Upstream API response contains no reply content")]
    EmptyChoices,

    /// A buffered call came back as a stream
    #[error("Upstream returned a stream where a complete response was expected")]
    UnexpectedStream,
}

/// Application-level error types
///
/// Every failure on the ad-hoc surface is reported as a JSON body with status 500,
/// whether the caller or the provider was at fault.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed input (e.g. an unparsable `/api/chat` body)
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Upstream completion provider failure
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = match self {
            AppError::Validation(_) | AppError::Upstream(_) => Json(json!({
                "error": "Failed to process chat request",
                "message": self.to_string(),
            })),
            AppError::Internal(_) => Json(json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            })),
        };

        (status, body).into_response()
    }
}

/// Errors raised while loading configuration at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is absent or empty
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    /// An environment variable is present but cannot be parsed
    #[error("Invalid value for {var}: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_500_with_chat_failure_body() {
        let response = AppError::Validation("expected value at line 1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to process chat request");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("expected value at line 1"));
    }

    #[tokio::test]
    async fn test_upstream_error_keeps_status_in_message() {
        let err = AppError::from(UpstreamError::Status {
            status: 401,
            body: "bad key".to_string(),
        });
        let body = body_json(err.into_response()).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("401"));
        assert!(message.contains("bad key"));
    }

    #[tokio::test]
    async fn test_internal_error_body() {
        let response = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], 500);
        assert!(body["error"].as_str().unwrap().contains("boom"));
    }
}
