//! Completion module
//!
//! Outbound calls to the upstream AI completion provider, in buffered or
//! streamed mode.

pub mod client;
pub mod types;

pub use client::{
    BufferedCompletion, ChunkStream, CompletionClient, CompletionOutcome, HttpCompletionClient,
};
pub use types::{ChatMessage, CompletionRequest, MessageList, ProviderResponse};
