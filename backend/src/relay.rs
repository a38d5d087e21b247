//! Relay service
//!
//! Orchestration shared by both client surfaces: record the user's message,
//! send the whole conversation upstream, record the assistant's reply.
//!
//! Failure policy: nothing is retried and nothing is rolled back. A user turn
//! that was appended before the upstream call failed stays in the log.

use crate::chat::{ChatRole, ChatTurn, ConversationStore};
use crate::completion::{ChatMessage, CompletionClient, CompletionOutcome, CompletionRequest};
use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use std::sync::Arc;
use tracing::{info, warn};

/// Values used when a caller leaves an override out
#[derive(Debug, Clone)]
pub struct RelayDefaults {
    /// Leading system prompt
    pub system_prompt: String,
    /// Upstream model identifier
    pub model: String,
}

impl From<&UpstreamConfig> for RelayDefaults {
    fn from(config: &UpstreamConfig) -> Self {
        Self {
            system_prompt: config.default_system_prompt.clone(),
            model: config.default_model.clone(),
        }
    }
}

/// Uniform outcome of `send_message`, shared by both surfaces
#[derive(Debug, Clone, PartialEq)]
pub enum RelayResult {
    /// The assistant answered; the turn is already in the log
    Replied(ChatTurn),
    /// Human-readable failure message
    Failed(String),
}

impl RelayResult {
    /// Whether the call produced a reply
    pub fn success(&self) -> bool {
        matches!(self, RelayResult::Replied(_))
    }

    /// The assistant turn, if any
    pub fn reply(&self) -> Option<&ChatTurn> {
        match self {
            RelayResult::Replied(turn) => Some(turn),
            RelayResult::Failed(_) => None,
        }
    }

    /// The failure message, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            RelayResult::Replied(_) => None,
            RelayResult::Failed(message) => Some(message),
        }
    }
}

/// Chat relay over a shared conversation log
pub struct RelayService {
    store: Arc<ConversationStore>,
    client: Arc<dyn CompletionClient>,
    defaults: RelayDefaults,
}

impl RelayService {
    /// Create a relay over an injected store and completion client
    pub fn new(
        store: Arc<ConversationStore>,
        client: Arc<dyn CompletionClient>,
        defaults: RelayDefaults,
    ) -> Self {
        Self {
            store,
            client,
            defaults,
        }
    }

    /// Send one user message and record the exchange
    ///
    /// The system prompt given here frames the entire history for this call
    /// only; no system prompt is stored in the log.
    ///
    /// Never fails past this boundary: errors come back as `RelayResult::Failed`.
    pub async fn send_message(
        &self,
        content: &str,
        system_prompt: Option<&str>,
        model: Option<&str>,
    ) -> RelayResult {
        let model = model.unwrap_or(self.defaults.model.as_str());
        match self.relay(content, system_prompt, model).await {
            Ok(reply) => {
                info!(
                    turn_id = %reply.id(),
                    model = %model,
                    reply_len = reply.content().len(),
                    "Relay reply recorded"
                );
                RelayResult::Replied(reply)
            }
            Err(e) => {
                warn!(model = %model, error = %e, "Relay call failed");
                RelayResult::Failed(e.to_string())
            }
        }
    }

    async fn relay(
        &self,
        content: &str,
        system_prompt: Option<&str>,
        model: &str,
    ) -> Result<ChatTurn, UpstreamError> {
        let history = self.store.append_and_snapshot(ChatTurn::user(content)).await;

        let system = system_prompt.unwrap_or(self.defaults.system_prompt.as_str());
        let messages: Vec<ChatMessage> =
            std::iter::once(ChatMessage::new(ChatRole::System.as_str(), system))
                .chain(history.iter().map(ChatMessage::from))
                .collect();

        let request = CompletionRequest::buffered(model, messages);
        let reply = match self.client.complete(request).await? {
            CompletionOutcome::Buffered(buffered) => buffered.first_choice_content()?,
            CompletionOutcome::Streamed(_) => return Err(UpstreamError::UnexpectedStream),
        };

        let turn = ChatTurn::assistant(reply);
        self.store.append(turn.clone()).await;
        Ok(turn)
    }

    /// Discard the whole conversation log
    pub async fn clear_history(&self) {
        self.store.clear().await;
        info!("Conversation history cleared");
    }

    /// Point-in-time copy of the conversation log
    pub async fn get_history(&self) -> Vec<ChatTurn> {
        self.store.snapshot().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::BufferedCompletion;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers with the last message's content and records every request
    #[derive(Default)]
    struct EchoClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl CompletionClient for EchoClient {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionOutcome, UpstreamError> {
            let last = request
                .messages
                .turns()
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            self.requests.lock().unwrap().push(request);
            let body = json!({"choices": [{"message": {"role": "assistant", "content": last}}]});
            Ok(CompletionOutcome::Buffered(BufferedCompletion::from_body(
                Bytes::from(body.to_string()),
            )?))
        }
    }

    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionOutcome, UpstreamError> {
            Err(UpstreamError::Status {
                status: 500,
                body: "provider down".to_string(),
            })
        }
    }

    struct NullContentClient;

    #[async_trait]
    impl CompletionClient for NullContentClient {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionOutcome, UpstreamError> {
            let body = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
            Ok(CompletionOutcome::Buffered(BufferedCompletion::from_body(
                Bytes::from(body.to_string()),
            )?))
        }
    }

    #[tokio::test]
    async fn test_null_reply_is_a_failure() {
        let relay = relay_with(Arc::new(NullContentClient));
        let result = relay.send_message("hi", None, None).await;

        assert!(!result.success());
        assert!(result.reply().is_none());
        let history = relay.get_history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role(), ChatRole::User);
    }

    struct StreamingClient;

    #[async_trait]
    impl CompletionClient for StreamingClient {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionOutcome, UpstreamError> {
            Ok(CompletionOutcome::Streamed(Box::pin(futures_util::stream::empty::<
                Result<Bytes, UpstreamError>,
            >())))
        }
    }

    fn defaults() -> RelayDefaults {
        RelayDefaults {
            system_prompt: "You are a helpful assistant.".to_string(),
            model: "deepseek-chat".to_string(),
        }
    }

    fn relay_with(client: Arc<dyn CompletionClient>) -> RelayService {
        RelayService::new(Arc::new(ConversationStore::new()), client, defaults())
    }

    fn roles_and_contents(turns: &[ChatTurn]) -> Vec<(ChatRole, String)> {
        turns
            .iter()
            .map(|t| (t.role(), t.content().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_call_keeps_user_turn() {
        let relay = relay_with(Arc::new(FailingClient));

        let result = relay.send_message("hi", None, None).await;
        assert!(!result.success());
        assert!(result.reply().is_none());
        assert!(!result.error().unwrap().is_empty());

        let history = relay.get_history().await;
        assert_eq!(
            roles_and_contents(&history),
            vec![(ChatRole::User, "hi".to_string())]
        );
    }

    #[tokio::test]
    async fn test_echo_builds_four_turn_log() {
        let client = Arc::new(EchoClient::default());
        let relay = relay_with(client.clone());

        let first = relay.send_message("hi", None, None).await;
        assert!(first.success());
        assert_eq!(first.reply().unwrap().content(), "hi");
        let second = relay.send_message("again", None, None).await;
        assert_eq!(second.reply().unwrap().role(), ChatRole::Assistant);

        let history = relay.get_history().await;
        assert_eq!(
            roles_and_contents(&history),
            vec![
                (ChatRole::User, "hi".to_string()),
                (ChatRole::Assistant, "hi".to_string()),
                (ChatRole::User, "again".to_string()),
                (ChatRole::Assistant, "again".to_string()),
            ]
        );

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let second_request = &requests[1];
        assert!(!second_request.stream);
        assert_eq!(
            second_request.messages.turns().to_vec(),
            vec![
                ChatMessage::new("system", "You are a helpful assistant."),
                ChatMessage::new("user", "hi"),
                ChatMessage::new("assistant", "hi"),
                ChatMessage::new("user", "again"),
            ]
        );
    }

    #[tokio::test]
    async fn test_reply_is_last_logged_turn() {
        let relay = relay_with(Arc::new(EchoClient::default()));
        let result = relay.send_message("ping", None, None).await;
        let history = relay.get_history().await;
        assert_eq!(history.last(), result.reply());
    }

    #[tokio::test]
    async fn test_overrides_are_applied_to_whole_context() {
        let client = Arc::new(EchoClient::default());
        let relay = relay_with(client.clone());

        relay.send_message("one", None, None).await;
        relay
            .send_message("two", Some("Answer in French."), Some("deepseek-reasoner"))
            .await;

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].model, "deepseek-chat");
        assert_eq!(requests[1].model, "deepseek-reasoner");
        assert_eq!(
            requests[1].messages.turns()[0],
            ChatMessage::new("system", "Answer in French.")
        );
        // history from the earlier call rides along under the new system prompt
        assert_eq!(requests[1].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_mixed_success_and_failure_counts() {
        let store = Arc::new(ConversationStore::new());
        let ok = RelayService::new(store.clone(), Arc::new(EchoClient::default()), defaults());
        let failing = RelayService::new(store.clone(), Arc::new(FailingClient), defaults());

        ok.send_message("a", None, None).await;
        failing.send_message("b", None, None).await;
        ok.send_message("c", None, None).await;

        let history = ok.get_history().await;
        assert_eq!(
            roles_and_contents(&history),
            vec![
                (ChatRole::User, "a".to_string()),
                (ChatRole::Assistant, "a".to_string()),
                (ChatRole::User, "b".to_string()),
                (ChatRole::User, "c".to_string()),
                (ChatRole::Assistant, "c".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_streamed_outcome_is_a_failure() {
        let relay = relay_with(Arc::new(StreamingClient));
        let result = relay.send_message("hi", None, None).await;
        assert!(!result.success());
        assert_eq!(relay.get_history().await.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let relay = relay_with(Arc::new(EchoClient::default()));
        relay.send_message("hi", None, None).await;
        relay.clear_history().await;
        assert!(relay.get_history().await.is_empty());
    }

    #[test]
    fn test_relay_result_accessors() {
        let failed = RelayResult::Failed("nope".to_string());
        assert!(!failed.success());
        assert_eq!(failed.error(), Some("nope"));

        let replied = RelayResult::Replied(ChatTurn::assistant("yes"));
        assert!(replied.success());
        assert!(replied.error().is_none());
    }
}
