//! Completion client
//!
//! Direct HTTP client for the upstream chat completions endpoint.
//! One outbound call per request; buffered calls return the whole body,
//! streamed calls hand back the live byte stream as soon as headers arrive.

use crate::completion::types::{CompletionRequest, ProviderResponse};
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::{stream::Stream, StreamExt};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use std::pin::Pin;

/// Live chunk sequence of a streamed completion
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send>>;

/// A complete provider response, kept byte-for-byte
#[derive(Debug, Clone)]
pub struct BufferedCompletion {
    body: Bytes,
}

impl BufferedCompletion {
    /// Wrap a response body, rejecting anything that is not JSON
    pub fn from_body(body: Bytes) -> Result<Self, UpstreamError> {
        serde_json::from_slice::<serde_json::Value>(&body)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;
        Ok(Self { body })
    }

    /// Raw body exactly as the provider sent it
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Content of the first choice's message
    ///
    /// # Errors
    /// * `UpstreamError::MalformedBody` if the body lacks the `choices` shape
    /// * `UpstreamError::EmptyChoices` if `choices` is empty or the first
    ///   message carries no content
    pub fn first_choice_content(&self) -> Result<String, UpstreamError> {
        let parsed: ProviderResponse = serde_json::from_slice(&self.body)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(UpstreamError::EmptyChoices)?;
        choice.message.content.ok_or(UpstreamError::EmptyChoices)
    }
}

/// Result of a completion call
///
/// Callers branch on the variant they got back instead of re-checking the
/// request's stream flag.
pub enum CompletionOutcome {
    /// Full response, already received
    Buffered(BufferedCompletion),
    /// Response still arriving
    Streamed(ChunkStream),
}

impl fmt::Debug for CompletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionOutcome::Buffered(buffered) => {
                f.debug_tuple("Buffered").field(buffered).finish()
            }
            CompletionOutcome::Streamed(_) => f.write_str("Streamed(..)"),
        }
    }
}

/// Capability to run one completion against the upstream provider
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Issue the call described by `request`
    ///
    /// Buffered when `request.stream` is false, streamed otherwise.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutcome, UpstreamError>;
}

/// `CompletionClient` that talks HTTP to the configured endpoint
pub struct HttpCompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Secret<String>,
}

impl HttpCompletionClient {
    /// Create a client for a fixed endpoint and credential
    pub fn new(api_url: impl Into<String>, api_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }

    /// Create a client from upstream configuration
    pub fn from_config(config: &UpstreamConfig) -> Self {
        Self::new(config.api_url.clone(), config.api_key.clone())
    }

    async fn send(&self, request: &CompletionRequest) -> Result<reqwest::Response, UpstreamError> {
        let mut builder = self
            .http
            .post(&self.api_url)
            .header(CONTENT_TYPE, "application/json")
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request);
        if request.stream {
            builder = builder.header(ACCEPT, "text/event-stream");
        }

        tracing::debug!(
            url = %self.api_url,
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Calling upstream completion API"
        );

        let response = builder.send().await.map_err(|e| {
            UpstreamError::Transport(format!("Failed to send request to upstream: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status_code = status_code,
                error_body = %body,
                "Upstream API returned error status"
            );
            return Err(UpstreamError::Status {
                status: status_code,
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutcome, UpstreamError> {
        let response = self.send(&request).await?;

        if request.stream {
            tracing::debug!(model = %request.model, "Upstream stream opened");
            let chunks = response.bytes_stream().map(|chunk| {
                chunk.map_err(|e| UpstreamError::Transport(format!("Stream error: {}", e)))
            });
            return Ok(CompletionOutcome::Streamed(Box::pin(chunks)));
        }

        let body = response.bytes().await.map_err(|e| {
            UpstreamError::Transport(format!("Failed to read upstream response body: {}", e))
        })?;
        tracing::debug!(response_len = body.len(), "Upstream response received");

        Ok(CompletionOutcome::Buffered(BufferedCompletion::from_body(
            body,
        )?))
    }
}
