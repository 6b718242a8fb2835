//! Wire types for the chat-completions protocol.

use serde::Serialize;
use serde_json::{json, Value};

/// Message role on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One function call inside an assistant wire message.
#[derive(Debug, Clone, Serialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireFunction {
    pub name: String,
    /// Raw JSON text, exactly as produced by the model.
    pub arguments: String,
}

/// One entry in the model-facing context.
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: WireRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::System,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Assistant,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Assistant message requesting a single tool call. `content` is only
    /// carried on the first call of a batch.
    pub fn assistant_tool_call(
        content: Option<String>,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            role: WireRole::Assistant,
            content,
            name: None,
            tool_calls: Some(vec![WireToolCall {
                id: id.into(),
                call_type: "function",
                function: WireFunction {
                    name: name.into(),
                    arguments: arguments.into(),
                },
            }]),
            tool_call_id: None,
        }
    }

    /// An external participant's turn. `name` distinguishes speakers that
    /// share the `user` role.
    pub fn named_user(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: WireRole::User,
            content: Some(content.into()),
            name: Some(name.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A tool result answering `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: WireRole::Tool,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool call proposed by the model, fully reassembled from the stream.
///
/// `arguments` stays raw JSON text: the runner parses it, and feeds it back
/// to the model verbatim on the next round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// One streaming chat call. Per-agent settings travel with the request; the
/// transport itself is shared and stateless.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// OpenAI-compatible API base URL (e.g. `http://localhost:11434/v1`).
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub messages: Vec<WireMessage>,
    /// Whether to advertise the command tool to the model.
    pub tools_enabled: bool,
}

/// Definition of the single supported tool.
pub fn bash_tool_spec() -> Value {
    json!([{
        "type": "function",
        "function": {
            "name": "bash",
            "description": "Run a shell command in the shared workspace sandbox. Use it for all file operations: reading (cat, head), writing (cat << EOF), listing (ls, find), searching (grep), and running code (python, node).",
            "parameters": {
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to execute"
                    }
                },
                "required": ["command"]
            }
        }
    }])
}
