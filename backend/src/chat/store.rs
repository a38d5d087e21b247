//! Conversation store
//!
//! The single, process-lifetime conversation log. Created empty at startup,
//! grows by append, and is reset only by an explicit clear. Nothing is persisted.

use super::models::ChatTurn;
use tokio::sync::RwLock;
use tracing::debug;

/// Ordered, append-only log of chat turns shared by every caller
///
/// The log is only reachable through this type; `snapshot` hands out copies.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: RwLock<Vec<ChatTurn>>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the log
    pub async fn append(&self, turn: ChatTurn) {
        let mut turns = self.turns.write().await;
        debug!(turn_id = %turn.id(), role = %turn.role(), "Appending turn");
        turns.push(turn);
    }

    /// Point-in-time copy of the log
    ///
    /// Appends that happen after this returns are not visible in the result.
    pub async fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns.read().await.clone()
    }

    /// Append a turn and copy the log under the same lock
    ///
    /// The returned sequence always ends with `turn`.
    pub async fn append_and_snapshot(&self, turn: ChatTurn) -> Vec<ChatTurn> {
        let mut turns = self.turns.write().await;
        debug!(turn_id = %turn.id(), role = %turn.role(), "Appending turn");
        turns.push(turn);
        turns.clone()
    }

    /// Discard every turn
    pub async fn clear(&self) {
        let mut turns = self.turns.write().await;
        debug!(discarded = turns.len(), "Clearing conversation log");
        turns.clear();
    }

    /// Number of turns currently in the log
    pub async fn len(&self) -> usize {
        self.turns.read().await.len()
    }

    /// Whether the log is empty
    pub async fn is_empty(&self) -> bool {
        self.turns.read().await.is_empty()
    }
}
