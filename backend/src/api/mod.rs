//! API module
//!
//! HTTP front-ends for the gateway: the ad-hoc REST surface under `/api/`,
//! the GraphQL surface at `/api/graphql`, and the shared CORS policy.

pub mod cors;
pub mod graphql;
pub mod rest;
pub mod streaming;

use crate::state::GatewayState;
use axum::{
    middleware,
    routing::{any, get, post},
    Router,
};

/// Build the full router over shared gateway state
pub fn router(state: GatewayState) -> Router {
    let api = Router::new()
        .route("/hello", any(rest::hello))
        .route("/status", any(rest::status))
        .route("/info", any(rest::info))
        .route("/chat", post(rest::chat).fallback(rest::api_not_found))
        .route(
            "/graphql",
            get(graphql::graphql_get)
                .post(graphql::graphql_post)
                .layer(middleware::from_fn(cors::graphql_cors)),
        )
        .fallback(rest::api_not_found);

    Router::new()
        .route("/", any(rest::root))
        .nest("/api", api)
        .fallback(rest::not_found)
        // OPTIONS is answered here before any handler runs
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}
