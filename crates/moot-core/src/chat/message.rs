//! Messages and the tool invocations recorded on them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::constants::{HUMAN_HANDLE, PASS_TOKEN};

/// A tool invocation an agent made while producing a message.
///
/// Exactly one tool kind exists today: `bash`, whose arguments carry a single
/// required `command` key.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// The command string, when the arguments carry one.
    pub fn command(&self) -> Option<&str> {
        self.arguments.get("command").and_then(Value::as_str)
    }
}

/// One entry in the shared thread. Immutable once finalized.
///
/// `tool_results` parallels `tool_calls` by index; the two are equal in length
/// on every finalized message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: String,
    pub content: String,
    pub tool_calls: Vec<ToolInvocation>,
    pub tool_results: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A plain text message with no tool activity.
    pub fn text(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_tools(sender, content, Vec::new(), Vec::new())
    }

    pub fn with_tools(
        sender: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
        tool_results: Vec<String>,
    ) -> Self {
        debug_assert!(tool_results.len() <= tool_calls.len());
        Self {
            id: Uuid::new_v4(),
            sender: sender.into(),
            content: content.into(),
            tool_calls,
            tool_results,
            timestamp: Utc::now(),
        }
    }

    pub fn is_from_human(&self) -> bool {
        self.sender == HUMAN_HANDLE
    }

    /// Whether the content signals an explicit pass for this exchange.
    pub fn is_pass(&self) -> bool {
        self.content
            .trim()
            .to_lowercase()
            .contains(&PASS_TOKEN.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_detection_is_case_insensitive() {
        assert!(Message::text("@data", "[PASS]").is_pass());
        assert!(Message::text("@data", "  [pass]  ").is_pass());
        assert!(Message::text("@data", "Nothing to add. [Pass]").is_pass());
        assert!(!Message::text("@data", "I'll pass the file along").is_pass());
    }

    #[test]
    fn command_extraction() {
        let inv = ToolInvocation::new("bash", serde_json::json!({"command": "ls -la"}));
        assert_eq!(inv.command(), Some("ls -la"));

        let missing = ToolInvocation::new("bash", serde_json::json!({}));
        assert_eq!(missing.command(), None);
    }
}
