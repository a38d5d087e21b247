//! Chat data models
//!
//! Defines the immutable chat turn and its speaker role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TURN_ID: AtomicU64 = AtomicU64::new(1);

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instruction framing for the model
    System,
    /// Message from the user
    User,
    /// Message from the assistant/AI
    Assistant,
}

impl ChatRole {
    /// Convert the role to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque turn identifier
///
/// Allocated from a process-wide counter, so ids compare in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(u64);

impl TurnId {
    fn next() -> Self {
        TurnId(NEXT_TURN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single message in the conversation log
///
/// Fields are private; a turn cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    id: TurnId,
    role: ChatRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a new turn stamped with a fresh id and the current time
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::next(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Shorthand for a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Shorthand for an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Turn identifier
    pub fn id(&self) -> TurnId {
        self.id
    }

    /// Speaker role
    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// Text payload
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
