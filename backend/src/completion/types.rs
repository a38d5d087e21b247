//! Upstream wire types
//!
//! Structs that mirror the OpenAI-compatible chat completions format spoken by
//! the upstream provider.

use crate::chat::ChatTurn;
use serde::{Deserialize, Serialize};

/// A `{role, content}` pair as sent upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Speaker role ("system", "user", "assistant", ...)
    pub role: String,
    /// Text content
    pub content: String,
}

impl ChatMessage {
    /// Build a message from a role name and content
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self::new(turn.role().as_str(), turn.content())
    }
}

/// Message payload of an outbound request
///
/// Context built from the conversation log is typed. A caller-supplied list
/// is kept as raw JSON so extra fields and non-string content reach the
/// provider unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageList {
    /// `{role, content}` pairs built by the gateway
    Turns(Vec<ChatMessage>),
    /// Messages exactly as the caller sent them
    Raw(Vec<serde_json::Value>),
}

impl MessageList {
    /// Number of messages
    pub fn len(&self) -> usize {
        match self {
            MessageList::Turns(turns) => turns.len(),
            MessageList::Raw(raw) => raw.len(),
        }
    }

    /// True when there are no messages
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Typed messages; empty for a raw list
    pub fn turns(&self) -> &[ChatMessage] {
        match self {
            MessageList::Turns(turns) => turns,
            MessageList::Raw(_) => &[],
        }
    }
}

impl From<Vec<ChatMessage>> for MessageList {
    fn from(turns: Vec<ChatMessage>) -> Self {
        MessageList::Turns(turns)
    }
}

impl From<Vec<serde_json::Value>> for MessageList {
    fn from(raw: Vec<serde_json::Value>) -> Self {
        MessageList::Raw(raw)
    }
}

/// Outbound completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Upstream model identifier
    pub model: String,
    /// Ordered context, oldest first
    pub messages: MessageList,
    /// `true` selects streamed mode, `false` buffered
    pub stream: bool,
}

impl CompletionRequest {
    /// Request whose full response is awaited before returning
    pub fn buffered(model: impl Into<String>, messages: impl Into<MessageList>) -> Self {
        Self {
            model: model.into(),
            messages: messages.into(),
            stream: false,
        }
    }

    /// Request whose response is forwarded chunk by chunk
    pub fn streamed(model: impl Into<String>, messages: impl Into<MessageList>) -> Self {
        Self {
            model: model.into(),
            messages: messages.into(),
            stream: true,
        }
    }

    /// Validate the request before it goes out
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if self.messages.is_empty() {
            return Err("messages cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Top-level buffered response from the provider
///
/// Only the fields the relay reads are modelled; the ad-hoc surface forwards
/// the raw body instead.
#[derive(Deserialize, Debug)]
pub struct ProviderResponse {
    /// Candidate completions, first one wins
    pub choices: Vec<Choice>,
}

/// One candidate completion
#[derive(Deserialize, Debug)]
pub struct Choice {
    /// The assistant message
    pub message: ChoiceMessage,
}

/// Message inside a choice
#[derive(Deserialize, Debug)]
pub struct ChoiceMessage {
    /// Text content; some providers send `null` here
    #[serde(default)]
    pub content: Option<String>,
}
