//! Model transport layer.
//!
//! Speaks the OpenAI-compatible streaming chat-completions protocol. These
//! are wire types, not domain types; the turn runner converts between them
//! and `chat::Message`.

pub mod error;
pub mod http;
pub mod sse;
pub mod streaming;
pub mod types;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use error::TransportError;
pub use http::HttpChatTransport;
pub use streaming::{FinishReason, StreamPart};
pub use types::{ChatRequest, ToolCall, WireMessage, WireRole};

/// An opaque streaming chat-completion service.
///
/// Implementations return a channel of `StreamPart`s; the call has failed
/// only when this method errors. Failures after the stream starts arrive as
/// `StreamPart::Error`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamPart>, TransportError>;
}
