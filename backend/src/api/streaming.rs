//! Streaming utilities for Server-Sent Events (SSE)
//!
//! Forwards an upstream completion stream to the client as it arrives.

use crate::completion::ChunkStream;
use crate::error::AppError;
use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::Response,
};
use futures_util::{stream::Stream, StreamExt};

/// SSE error prefix
pub const SSE_ERROR_PREFIX: &str = "[ERROR]";

/// Create an SSE response that relays upstream chunks verbatim
///
/// # Arguments
/// * `chunks` - Live upstream byte stream
///
/// # Returns
/// * `Result<Response, AppError>` - SSE HTTP response or error
pub fn sse_passthrough(chunks: ChunkStream) -> Result<Response, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(forward(chunks)))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build SSE response: {}", e)))
}

/// Pass chunks through untouched; a failed read ends the stream with one error event
fn forward(mut chunks: ChunkStream) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    use async_stream::stream;

    stream! {
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => yield Ok(bytes),
                Err(e) => {
                    tracing::warn!(error = %e, "Upstream stream interrupted");
                    yield Ok(Bytes::from(format!("data: {} {}\n\n", SSE_ERROR_PREFIX, e)));
                    break;
                }
            }
        }
    }
}
