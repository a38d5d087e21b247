//! Shared helpers for gateway integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chat_relay_gateway::api::router;
use chat_relay_gateway::completion::HttpCompletionClient;
use chat_relay_gateway::config::{
    Config, GatewayInfo, GraphqlConfig, ServerConfig, UpstreamConfig, DEFAULT_MODEL,
    DEFAULT_SYSTEM_PROMPT,
};
use chat_relay_gateway::state::GatewayState;
use secrecy::Secret;
use std::sync::Arc;
use tower::ServiceExt;

/// Config pointing the upstream client at `api_url`
pub fn test_config(api_url: &str) -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        upstream: UpstreamConfig {
            api_url: api_url.to_string(),
            api_key: Secret::new("test-key".to_string()),
            default_model: DEFAULT_MODEL.to_string(),
            default_system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        },
        gateway: GatewayInfo {
            name: "chat-relay-gateway".to_string(),
            domain: "example.test".to_string(),
        },
        graphql: GraphqlConfig { mask_errors: true },
    }
}

/// Gateway state and router backed by a real HTTP client aimed at `upstream_base`
pub fn test_app(upstream_base: &str) -> (GatewayState, Router) {
    let config = test_config(&format!("{}/chat/completions", upstream_base));
    let client = Arc::new(HttpCompletionClient::from_config(&config.upstream));
    let state = GatewayState::new(config, client);
    let app = router(state.clone());
    (state, app)
}

/// Send one request through the router
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Read a whole body as bytes
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Read a whole body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// POST a JSON string
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Request with an empty body
pub fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
