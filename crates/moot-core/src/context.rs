//! Per-agent context construction.
//!
//! Serializes the recent thread into the shape the model transport expects.
//! The target agent sees its own turns as assistant turns with complete tool
//! activity; everyone else's turns are `user` entries whose tool detail is
//! governed by the CONSUMING agent's visibility level.

use crate::chat::{AgentProfile, Conversation, Message, ToolVisibility};
use crate::constants::{
    CONTEXT_WINDOW_MESSAGES, FULL_TOOL_OUTPUT_CAP, SUMMARY_COMMAND_CAP, SUMMARY_RESULT_LINES,
};
use crate::model::WireMessage;

/// Build the ordered context for one agent: its instructions first, then the
/// most recent `CONTEXT_WINDOW_MESSAGES` messages.
pub fn build_context(agent: &AgentProfile, conversation: &Conversation) -> Vec<WireMessage> {
    let mut out = vec![WireMessage::system(&agent.instructions)];

    for message in conversation.recent(CONTEXT_WINDOW_MESSAGES) {
        if message.sender == agent.handle {
            append_own_turn(&mut out, message);
        } else {
            out.push(other_turn(message, agent.tool_visibility));
        }
    }

    out
}

/// An agent always sees its own tool activity completely: each invocation
/// becomes an assistant tool-call entry followed by its tool result, with
/// synthetic per-message call ids.
fn append_own_turn(out: &mut Vec<WireMessage>, message: &Message) {
    if message.tool_calls.is_empty() {
        out.push(WireMessage::assistant(&message.content));
        return;
    }

    for (i, call) in message.tool_calls.iter().enumerate() {
        let call_id = format!("call_{i}");
        out.push(WireMessage::assistant_tool_call(
            (i == 0).then(|| message.content.clone()),
            &call_id,
            &call.name,
            call.arguments.to_string(),
        ));
        let result = message
            .tool_results
            .get(i)
            .cloned()
            .unwrap_or_default();
        out.push(WireMessage::tool_result(&call_id, result));
    }
}

fn other_turn(message: &Message, visibility: ToolVisibility) -> WireMessage {
    let name = message.sender.trim_start_matches('@');
    let mut content = message.content.clone();

    if let Some(block) = format_tool_activity(message, visibility) {
        content.push_str("\n\n");
        content.push_str(&block);
    }

    WireMessage::named_user(name, content)
}

/// Render another participant's tool activity at the given detail level.
fn format_tool_activity(message: &Message, visibility: ToolVisibility) -> Option<String> {
    if message.tool_calls.is_empty() || visibility == ToolVisibility::None {
        return None;
    }

    let mut parts = Vec::with_capacity(message.tool_calls.len());
    for (i, call) in message.tool_calls.iter().enumerate() {
        let command = call.command().unwrap_or("?");
        let result = message.tool_results.get(i).map(String::as_str).unwrap_or("");

        match visibility {
            ToolVisibility::Summary => {
                let first_line = command.lines().next().unwrap_or("");
                let short = cap_chars(first_line, SUMMARY_COMMAND_CAP);
                parts.push(format!(
                    "$ {short}\n{}",
                    summarize_lines(result, SUMMARY_RESULT_LINES)
                ));
            }
            ToolVisibility::Full => {
                parts.push(format!("$ {command}\n{}", cap_chars(result, FULL_TOOL_OUTPUT_CAP)));
            }
            ToolVisibility::None => unreachable!("handled above"),
        }
    }

    Some(parts.join("\n\n"))
}

/// Keep the first `max` lines, eliding the rest with a marker.
fn summarize_lines(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() <= max {
        return trimmed.to_string();
    }
    format!(
        "{}\n... ({} more lines)",
        lines[..max].join("\n"),
        lines.len() - max
    )
}

/// Cap to `max` bytes on a char boundary, appending a truncation marker.
fn cap_chars(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut boundary = max;
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    format!("{}...", &text[..boundary])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::profile::tests_support::always_agent;
    use crate::chat::{Roster, ToolInvocation};
    use crate::model::WireRole;
    use serde_json::json;

    fn agent_with_visibility(visibility: ToolVisibility) -> AgentProfile {
        AgentProfile {
            instructions: "be helpful".to_string(),
            tool_visibility: visibility,
            ..always_agent("@data")
        }
    }

    fn conversation_with_code_tool_message() -> Conversation {
        let roster =
            Roster::new(vec![always_agent("@data"), always_agent("@code")]).unwrap();
        let mut conv = Conversation::new(roster);
        conv.push(Message::with_tools(
            "@code",
            "checked the file",
            vec![ToolInvocation::new("bash", json!({"command": "wc -l data.csv"}))],
            vec!["120 data.csv".to_string()],
        ));
        conv
    }

    #[test]
    fn instructions_come_first() {
        let agent = agent_with_visibility(ToolVisibility::Full);
        let conv = conversation_with_code_tool_message();
        let context = build_context(&agent, &conv);
        assert_eq!(context[0].role, WireRole::System);
        assert_eq!(context[0].content.as_deref(), Some("be helpful"));
    }

    #[test]
    fn full_visibility_embeds_command_and_output() {
        let agent = agent_with_visibility(ToolVisibility::Full);
        let conv = conversation_with_code_tool_message();
        let context = build_context(&agent, &conv);
        let entry = &context[1];
        assert_eq!(entry.role, WireRole::User);
        assert_eq!(entry.name.as_deref(), Some("code"));
        let content = entry.content.as_deref().unwrap();
        assert!(content.contains("$ wc -l data.csv"));
        assert!(content.contains("120 data.csv"));
    }

    #[test]
    fn full_visibility_caps_long_output() {
        let agent = agent_with_visibility(ToolVisibility::Full);
        let roster = Roster::new(vec![always_agent("@data"), always_agent("@code")]).unwrap();
        let mut conv = Conversation::new(roster);
        conv.push(Message::with_tools(
            "@code",
            "dumped it",
            vec![ToolInvocation::new("bash", json!({"command": "cat big"}))],
            vec!["x".repeat(2_000)],
        ));
        let content = build_context(&agent, &conv)[1].content.clone().unwrap();
        assert!(content.contains("..."));
        assert!(content.len() < 2_000);
    }

    #[test]
    fn summary_visibility_elides_output_lines() {
        let agent = agent_with_visibility(ToolVisibility::Summary);
        let roster = Roster::new(vec![always_agent("@data"), always_agent("@code")]).unwrap();
        let mut conv = Conversation::new(roster);
        conv.push(Message::with_tools(
            "@code",
            "listed",
            vec![ToolInvocation::new("bash", json!({"command": "ls -la\n# second line"}))],
            vec!["a\nb\nc\nd\ne".to_string()],
        ));
        let content = build_context(&agent, &conv)[1].content.clone().unwrap();
        assert!(content.contains("$ ls -la"));
        assert!(!content.contains("# second line"));
        assert!(content.contains("(2 more lines)"));
        assert!(!content.contains("\ne"));
    }

    #[test]
    fn none_visibility_shows_text_only() {
        let agent = agent_with_visibility(ToolVisibility::None);
        let conv = conversation_with_code_tool_message();
        let content = build_context(&agent, &conv)[1].content.clone().unwrap();
        assert_eq!(content, "checked the file");
    }

    #[test]
    fn own_tool_activity_round_trips_verbatim() {
        let agent = agent_with_visibility(ToolVisibility::None);
        let roster = Roster::new(vec![always_agent("@data")]).unwrap();
        let mut conv = Conversation::new(roster);
        conv.push(Message::with_tools(
            "@data",
            "running it",
            vec![
                ToolInvocation::new("bash", json!({"command": "head data.csv"})),
                ToolInvocation::new("bash", json!({"command": "tail data.csv"})),
            ],
            vec!["first rows".to_string(), "last rows".to_string()],
        ));
        let context = build_context(&agent, &conv);

        // system + (assistant tool-call + tool result) per invocation
        assert_eq!(context.len(), 5);
        assert_eq!(context[1].role, WireRole::Assistant);
        assert_eq!(context[1].content.as_deref(), Some("running it"));
        let call = &context[1].tool_calls.as_ref().unwrap()[0];
        assert_eq!(call.id, "call_0");
        assert!(call.function.arguments.contains("head data.csv"));
        assert_eq!(context[2].role, WireRole::Tool);
        assert_eq!(context[2].content.as_deref(), Some("first rows"));
        assert_eq!(context[2].tool_call_id.as_deref(), Some("call_0"));
        // own tool activity is complete regardless of the visibility level
        assert_eq!(context[4].content.as_deref(), Some("last rows"));
    }

    #[test]
    fn window_keeps_only_the_most_recent_messages() {
        let agent = agent_with_visibility(ToolVisibility::Full);
        let roster = Roster::new(vec![always_agent("@data")]).unwrap();
        let mut conv = Conversation::new(roster);
        for i in 0..(CONTEXT_WINDOW_MESSAGES + 5) {
            conv.push(Message::text("@user", format!("m{i}")));
        }
        let context = build_context(&agent, &conv);
        assert_eq!(context.len(), 1 + CONTEXT_WINDOW_MESSAGES);
        assert_eq!(context[1].content.as_deref(), Some("m5"));
    }
}
