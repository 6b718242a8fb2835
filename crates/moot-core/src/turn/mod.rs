//! One agent's turn: the bounded model-call/tool-call round loop.
//!
//! Each round streams a model response, then runs any proposed commands in
//! the sandbox, one at a time in proposal order, feeding results back as
//! context for the next round. The round count is capped; transport failures
//! finalize the turn with error content instead of crashing.

mod stream;

use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::chat::{AgentProfile, Conversation, Message, ToolInvocation};
use crate::context;
use crate::events::RoomEvent;
use crate::model::{ChatRequest, ChatTransport, FinishReason, WireMessage};
use crate::sandbox::{self, SandboxExecutor};

use self::stream::{process_round, RoundOutcome};

/// Bounds applied to a single turn.
#[derive(Debug, Clone)]
pub struct TurnLimits {
    pub max_rounds: usize,
    pub sandbox_timeout: Duration,
}

/// How a turn ended.
pub(crate) enum TurnEnd {
    /// The finalized message, ready to append (or to be treated as a pass).
    Completed(Message),
    /// Interrupted by the operator; nothing to append.
    Cancelled,
}

pub(crate) async fn run_turn(
    agent: &AgentProfile,
    conversation: &Conversation,
    transport: &dyn ChatTransport,
    sandbox: &dyn SandboxExecutor,
    limits: &TurnLimits,
    event_tx: &mpsc::UnboundedSender<RoomEvent>,
    cancel: &CancellationToken,
) -> TurnEnd {
    let mut wire = context::build_context(agent, conversation);
    let mut content = String::new();
    let mut tool_calls: Vec<ToolInvocation> = Vec::new();
    let mut tool_results: Vec<String> = Vec::new();

    for _ in 0..limits.max_rounds {
        let request = ChatRequest {
            endpoint: agent.endpoint.clone(),
            api_key: agent.api_key.clone(),
            model: agent.model.clone(),
            temperature: agent.temperature,
            messages: wire.clone(),
            tools_enabled: agent.tools_enabled,
        };

        let rx = match transport.stream_chat(request).await {
            Ok(rx) => rx,
            Err(e) => {
                return TurnEnd::Completed(finalize_error(
                    agent,
                    content,
                    tool_calls,
                    tool_results,
                    &e.to_string(),
                    event_tx,
                ));
            }
        };

        let round = match process_round(rx, event_tx, cancel).await {
            RoundOutcome::Cancelled => return TurnEnd::Cancelled,
            RoundOutcome::Complete(round) => round,
        };

        content.push_str(&round.text);

        if let Some(error) = round.error {
            return TurnEnd::Completed(finalize_error(
                agent,
                content,
                tool_calls,
                tool_results,
                &error,
                event_tx,
            ));
        }

        if round.tool_calls.is_empty() || matches!(round.finish, Some(FinishReason::Stop)) {
            return TurnEnd::Completed(Message::with_tools(
                &agent.handle,
                content,
                tool_calls,
                tool_results,
            ));
        }

        for call in &round.tool_calls {
            if cancel.is_cancelled() {
                return TurnEnd::Cancelled;
            }

            let arguments = parse_arguments(&call.arguments);
            let command = arguments
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            let _ = event_tx.send(RoomEvent::ToolExecuting {
                command: command.clone(),
            });
            let output = sandbox.execute(&command, limits.sandbox_timeout).await;
            let _ = event_tx.send(RoomEvent::ToolResult {
                output: output.clone(),
                is_error: sandbox::is_failure(&output),
            });

            wire.push(WireMessage::assistant_tool_call(
                None,
                &call.id,
                &call.name,
                &call.arguments,
            ));
            wire.push(WireMessage::tool_result(&call.id, &output));
            tool_calls.push(ToolInvocation::new(&call.name, arguments));
            tool_results.push(output);
        }
    }

    let _ = event_tx.send(RoomEvent::RoundLimitReached {
        rounds: limits.max_rounds,
    });
    TurnEnd::Completed(Message::with_tools(
        &agent.handle,
        content,
        tool_calls,
        tool_results,
    ))
}

/// Parse streamed tool arguments. Malformed JSON degrades to treating the
/// raw text as the command itself rather than aborting the turn.
fn parse_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => json!({ "command": raw }),
    }
}

/// Transport failure: no retry. The turn finalizes with content carrying the
/// error description; the message still joins history like any other.
fn finalize_error(
    agent: &AgentProfile,
    content: String,
    tool_calls: Vec<ToolInvocation>,
    tool_results: Vec<String>,
    error: &str,
    event_tx: &mpsc::UnboundedSender<RoomEvent>,
) -> Message {
    let _ = event_tx.send(RoomEvent::TransportError {
        error: error.to_string(),
    });
    let content = if content.is_empty() {
        format!("[ERROR: {error}]")
    } else {
        format!("{content}\n[ERROR: {error}]")
    };
    Message::with_tools(&agent.handle, content, tool_calls, tool_results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_arguments_become_the_command() {
        let args = parse_arguments("ls -la");
        assert_eq!(args.get("command").unwrap().as_str(), Some("ls -la"));

        let args = parse_arguments(r#"{"command": "pwd"}"#);
        assert_eq!(args.get("command").unwrap().as_str(), Some("pwd"));
    }
}
