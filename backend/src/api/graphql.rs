//! Schema-typed client surface
//!
//! GraphQL queries, mutations, and a declared-only subscription. Every
//! operation goes through the relay, so this surface always reads and
//! writes the shared conversation log.

use crate::chat::ChatTurn;
use crate::config::GatewayInfo;
use crate::relay::{RelayResult, RelayService};
use crate::state::GatewayState;
use async_graphql::{
    http::{parse_query_string, GraphiQLSource},
    parser::{parse_query, types::OperationType},
    Context, InputObject, Object, Schema, SimpleObject, Subscription, ID,
};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use futures_util::stream::{self, Stream};
use std::sync::Arc;

/// Fixed liveness answer of the `health` query
pub const HEALTH_MESSAGE: &str = "Chat relay GraphQL service is running";

/// Error code attached to every resolver failure
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// Message shown in place of resolver error details when masking is on
pub const MASKED_ERROR_MESSAGE: &str = "Internal server error";

/// Endpoints advertised by `workerInfo`
pub const ENDPOINTS: [&str; 5] = [
    "/api/graphql - GraphQL endpoint",
    "/api/chat - REST chat endpoint",
    "/api/hello - Hello endpoint",
    "/api/status - Status endpoint",
    "/api/info - Info endpoint",
];

/// Executable schema type
pub type GatewaySchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the schema over a relay and deployment metadata
pub fn build_schema(relay: Arc<RelayService>, info: GatewayInfo) -> GatewaySchema {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(relay)
        .data(info)
        .finish()
}

/// One conversation turn as exposed to clients
#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Message")]
pub struct MessageNode {
    id: ID,
    role: String,
    content: String,
    timestamp: String,
}

impl From<&ChatTurn> for MessageNode {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            id: ID(turn.id().to_string()),
            role: turn.role().as_str().to_string(),
            content: turn.content().to_string(),
            timestamp: turn.created_at().to_rfc3339(),
        }
    }
}

/// Arguments of `sendChatMessage`
#[derive(InputObject, Debug)]
pub struct ChatInput {
    /// New user message
    pub message: String,
    /// Per-call system prompt override
    pub system_message: Option<String>,
    /// Per-call model override
    pub model: Option<String>,
}

/// Result of `sendChatMessage`
#[derive(SimpleObject, Debug)]
pub struct ChatResponse {
    success: bool,
    message: Option<MessageNode>,
    error: Option<String>,
}

impl From<RelayResult> for ChatResponse {
    fn from(result: RelayResult) -> Self {
        Self {
            success: result.success(),
            message: result.reply().map(MessageNode::from),
            error: result.error().map(str::to_string),
        }
    }
}

/// Static deployment metadata
#[derive(SimpleObject, Debug)]
pub struct WorkerInfo {
    name: String,
    version: String,
    domain: String,
    timestamp: String,
    endpoints: Vec<String>,
}

/// Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Full conversation log, oldest first
    async fn get_chat_history(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<MessageNode>> {
        let relay = ctx.data::<Arc<RelayService>>()?;
        Ok(relay.get_history().await.iter().map(MessageNode::from).collect())
    }

    /// Liveness check
    async fn health(&self) -> &'static str {
        HEALTH_MESSAGE
    }

    /// Deployment metadata
    async fn worker_info(&self, ctx: &Context<'_>) -> async_graphql::Result<WorkerInfo> {
        let info = ctx.data::<GatewayInfo>()?;
        Ok(WorkerInfo {
            name: info.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            domain: info.domain.clone(),
            timestamp: Utc::now().to_rfc3339(),
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        })
    }
}

/// Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Relay one message and record the exchange
    async fn send_chat_message(
        &self,
        ctx: &Context<'_>,
        input: ChatInput,
    ) -> async_graphql::Result<ChatResponse> {
        let relay = ctx.data::<Arc<RelayService>>()?;
        let result = relay
            .send_message(
                &input.message,
                input.system_message.as_deref(),
                input.model.as_deref(),
            )
            .await;
        Ok(result.into())
    }

    /// Discard the conversation log
    async fn clear_chat_history(&self, ctx: &Context<'_>) -> async_graphql::Result<bool> {
        ctx.data::<Arc<RelayService>>()?.clear_history().await;
        Ok(true)
    }
}

/// Subscription root
///
/// `messageAdded` is part of the published schema but has no publisher
/// behind it: every subscription completes without yielding.
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// New conversation turns (not implemented; never yields)
    async fn message_added(&self) -> impl Stream<Item = MessageNode> {
        stream::empty()
    }
}

/// Tag resolver failures with the uniform error code and a timestamp
///
/// Only errors raised while resolving a field (those with a path) are
/// touched; parse and validation errors pass through unchanged.
pub fn wrap_resolver_errors(
    mut response: async_graphql::Response,
    mask: bool,
) -> async_graphql::Response {
    for error in response.errors.iter_mut().filter(|e| !e.path.is_empty()) {
        tracing::error!(message = %error.message, path = ?error.path, "GraphQL resolver error");
        if mask {
            error.message = MASKED_ERROR_MESSAGE.to_string();
        }
        let extensions = error.extensions.get_or_insert_with(Default::default);
        extensions.set("code", INTERNAL_ERROR_CODE);
        extensions.set("timestamp", Utc::now().to_rfc3339());
    }
    response
}

async fn execute(state: &GatewayState, request: async_graphql::Request) -> GraphQLResponse {
    let response = state.schema.execute(request).await;
    wrap_resolver_errors(response, state.config.graphql.mask_errors).into()
}

/// POST /api/graphql - Execute an operation
pub async fn graphql_post(
    State(state): State<GatewayState>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    execute(&state, request.into_inner()).await
}

/// Message returned when a mutation arrives over GET
pub const GET_MUTATION_MESSAGE: &str = "Can only perform a mutation operation from a POST request.";

/// GET /api/graphql - Execute a read-only query from the URL, or serve the explorer
///
/// Mutations are refused with 405 so a plain link cannot change the log.
pub async fn graphql_get(State(state): State<GatewayState>, uri: Uri) -> Response {
    let Some(query_string) = uri.query() else {
        return explorer();
    };

    let request = match parse_query_string(query_string) {
        Ok(request) => request,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    if request.query.trim().is_empty() {
        return explorer();
    }
    if selects_mutation(&request) {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "POST")],
            GET_MUTATION_MESSAGE,
        )
            .into_response();
    }

    execute(&state, request).await.into_response()
}

fn explorer() -> Response {
    Html(GraphiQLSource::build().endpoint("/api/graphql").finish()).into_response()
}

/// Whether the operation the request would run is a mutation
///
/// Unparsable documents report false and fail later during execution.
fn selects_mutation(request: &async_graphql::Request) -> bool {
    let Ok(document) = parse_query(&request.query) else {
        return false;
    };
    document.operations.iter().any(|(name, operation)| {
        let selected = match (request.operation_name.as_deref(), name) {
            (Some(wanted), Some(name)) => name.as_str() == wanted,
            (Some(_), None) => false,
            (None, _) => true,
        };
        selected && operation.node.ty == OperationType::Mutation
    })
}
