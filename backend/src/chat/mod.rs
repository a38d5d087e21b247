//! Chat module
//!
//! Holds the chat turn model and the process-lifetime conversation log.

pub mod models;
pub mod store;

pub use models::{ChatRole, ChatTurn, TurnId};
pub use store::ConversationStore;
