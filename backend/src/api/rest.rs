//! Ad-hoc client surface
//!
//! Static informational endpoints plus `/api/chat`, a direct pass-through to
//! the completion client. Unlike the schema surface, `/api/chat` never reads
//! or writes the conversation log: callers send the full message list
//! themselves and get the provider's answer back untouched.

use crate::api::streaming::sse_passthrough;
use crate::completion::{ChatMessage, CompletionOutcome, CompletionRequest, MessageList};
use crate::config::DEFAULT_SYSTEM_PROMPT;
use crate::error::AppError;
use crate::state::GatewayState;
use axum::{
    body::{Body, Bytes},
    extract::{OriginalUri, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Paths listed in the API 404 body
pub const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "/api/hello",
    "/api/status",
    "/api/info",
    "/api/chat",
    "/api/graphql",
];

/// Body of POST /api/chat; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct AdHocChatRequest {
    /// Upstream model, defaults to the configured baseline
    #[serde(default)]
    pub model: Option<String>,
    /// Full explicit conversation, forwarded untouched; defaults to a one-turn greeting
    #[serde(default)]
    pub messages: Option<Vec<serde_json::Value>>,
    /// Streamed when true or absent
    #[serde(default, alias = "streaming")]
    pub stream: Option<bool>,
}

impl AdHocChatRequest {
    /// Resolve defaults into an outbound completion request
    pub fn into_completion(self, default_model: &str) -> CompletionRequest {
        let model = self
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model.to_string());
        let messages = match self.messages {
            Some(raw) => MessageList::Raw(raw),
            None => MessageList::Turns(default_conversation()),
        };

        if self.stream.unwrap_or(true) {
            CompletionRequest::streamed(model, messages)
        } else {
            CompletionRequest::buffered(model, messages)
        }
    }
}

fn default_conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::new("system", DEFAULT_SYSTEM_PROMPT),
        ChatMessage::new("user", "Hello!"),
    ]
}

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct HelloResponse {
    pub message: String,
    pub timestamp: String,
    pub path: String,
    pub method: String,
    pub domain: String,
}

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub domain: String,
    pub timestamp: String,
    pub uptime: String,
}

#[allow(missing_docs)]
#[derive(Serialize)]
pub struct InfoResponse {
    pub project: String,
    pub domain: String,
    pub endpoints: Vec<String>,
    pub features: Vec<String>,
    pub timestamp: String,
}

/// GET / - Plain-text greeting
pub async fn root(State(state): State<GatewayState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!(
            "Hello World! {} is running on {}!",
            state.config.gateway.name, state.config.gateway.domain
        ),
    )
        .into_response()
}

/// Anything outside `/` and `/api/` - plain-text 404
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Unmatched path under `/api/` - JSON 404 listing the real endpoints
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "API endpoint not found",
            "path": uri.path(),
            "available_endpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

/// /api/hello - Greeting with request metadata
pub async fn hello(
    State(state): State<GatewayState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Json<HelloResponse> {
    Json(HelloResponse {
        message: format!("Hello from {} API!", state.config.gateway.domain),
        timestamp: Utc::now().to_rfc3339(),
        path: uri.path().to_string(),
        method: method.to_string(),
        domain: state.config.gateway.domain.clone(),
    })
}

/// /api/status - Service status
pub async fn status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        service: state.config.gateway.name.clone(),
        domain: state.config.gateway.domain.clone(),
        timestamp: Utc::now().to_rfc3339(),
        uptime: "Always available!".to_string(),
    })
}

/// /api/info - Capability description
pub async fn info(State(state): State<GatewayState>) -> Json<InfoResponse> {
    let endpoints = [
        "/api/hello - Get hello message",
        "/api/status - Get service status",
        "/api/info - Get API information",
        "/api/chat - Chat with the upstream AI provider (POST)",
        "/api/graphql - GraphQL endpoint (GET/POST)",
    ];
    let features = [
        "REST API endpoints",
        "GraphQL API",
        "Upstream AI chat relay",
        "CORS support",
        "Streaming chat responses",
    ];

    Json(InfoResponse {
        project: format!("{} with GraphQL", state.config.gateway.name),
        domain: state.config.gateway.domain.clone(),
        endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
        features: features.iter().map(|s| s.to_string()).collect(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// POST /api/chat - Forward a completion request upstream
///
/// Streams the provider's events through when `stream` is true (the default),
/// otherwise returns the provider's JSON body byte-for-byte. Any failure,
/// including an unparsable body, is reported as a 500.
pub async fn chat(State(state): State<GatewayState>, body: Bytes) -> Result<Response, AppError> {
    let request: AdHocChatRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::Validation(e.to_string()))?;
    let completion = request.into_completion(&state.config.upstream.default_model);
    completion.validate().map_err(AppError::Validation)?;

    tracing::info!(
        model = %completion.model,
        messages = completion.messages.len(),
        stream = completion.stream,
        "Ad-hoc chat request"
    );

    match state.completions.complete(completion).await? {
        CompletionOutcome::Streamed(chunks) => sse_passthrough(chunks),
        CompletionOutcome::Buffered(buffered) => Ok((
            [(header::CONTENT_TYPE, "application/json")],
            Body::from(buffered.body().clone()),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_to_streamed_greeting() {
        let completion = AdHocChatRequest::default().into_completion("deepseek-chat");
        assert_eq!(completion.model, "deepseek-chat");
        assert!(completion.stream);
        assert_eq!(completion.messages, MessageList::Turns(default_conversation()));
        assert_eq!(completion.messages.turns().last().unwrap().content, "Hello!");
    }

    #[test]
    fn test_explicit_fields_win() {
        let request: AdHocChatRequest = serde_json::from_str(
            r#"{"model":"deepseek-reasoner","messages":[{"role":"user","content":"yo"}],"stream":false}"#,
        )
        .unwrap();
        let completion = request.into_completion("deepseek-chat");
        assert_eq!(completion.model, "deepseek-reasoner");
        assert!(!completion.stream);
        assert_eq!(
            completion.messages,
            MessageList::Raw(vec![json!({"role": "user", "content": "yo"})])
        );
    }

    #[test]
    fn test_explicit_messages_keep_extra_fields() {
        let request: AdHocChatRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":[{"type":"text","text":"hi"}],"name":"bob"},{"role":"assistant","content":null}]}"#,
        )
        .unwrap();
        let completion = request.into_completion("deepseek-chat");
        let json = serde_json::to_value(&completion).unwrap();
        assert_eq!(json["messages"][0]["name"], "bob");
        assert_eq!(json["messages"][0]["content"][0]["text"], "hi");
        assert!(json["messages"][1]["content"].is_null());
        assert_eq!(completion.messages.len(), 2);
    }

    #[test]
    fn test_empty_model_falls_back() {
        let request: AdHocChatRequest = serde_json::from_str(r#"{"model":""}"#).unwrap();
        assert_eq!(request.into_completion("base").model, "base");
    }

    #[test]
    fn test_streaming_alias() {
        let request: AdHocChatRequest = serde_json::from_str(r#"{"streaming":false}"#).unwrap();
        assert_eq!(request.stream, Some(false));
    }
}
