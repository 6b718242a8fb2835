//! Stream fragments produced while a model response arrives.

use super::types::ToolCall;

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    /// Ordinary end of turn.
    Stop,
    /// The model wants its proposed tool calls executed.
    ToolCalls,
    /// Anything else (length, content filter, provider-specific).
    Other(String),
}

/// One fragment of a streaming response.
#[derive(Debug, Clone)]
pub enum StreamPart {
    /// Text content delta, to be forwarded in arrival order.
    TextDelta { delta: String },

    /// A tool call began streaming; its arguments follow in later fragments.
    ToolCallStart { id: String, name: String },

    /// A tool call finished reassembling.
    ToolCallComplete { tool_call: ToolCall },

    /// The model signalled the end of the response.
    Finish { reason: FinishReason },

    /// The stream failed mid-flight.
    Error { error: String },
}
