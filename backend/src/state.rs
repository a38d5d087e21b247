//! Shared gateway state
//!
//! One instance is built at startup and cloned into every handler. The
//! conversation store lives behind the relay; no handler touches it directly.

use crate::api::graphql::{build_schema, GatewaySchema};
use crate::chat::ConversationStore;
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::relay::{RelayDefaults, RelayService};
use std::sync::Arc;

/// Handles injected into both client surfaces
#[derive(Clone)]
pub struct GatewayState {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Raw completion capability, used by the ad-hoc surface
    pub completions: Arc<dyn CompletionClient>,
    /// History-accumulating relay, used by the schema surface
    pub relay: Arc<RelayService>,
    /// Executable schema for the schema surface
    pub schema: GatewaySchema,
}

impl GatewayState {
    /// Wire a fresh, empty conversation log to the given completion client
    pub fn new(config: Config, completions: Arc<dyn CompletionClient>) -> Self {
        let store = Arc::new(ConversationStore::new());
        let relay = Arc::new(RelayService::new(
            store,
            completions.clone(),
            RelayDefaults::from(&config.upstream),
        ));
        let schema = build_schema(relay.clone(), config.gateway.clone());

        Self {
            config: Arc::new(config),
            completions,
            relay,
            schema,
        }
    }
}
