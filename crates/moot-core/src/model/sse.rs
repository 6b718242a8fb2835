//! SSE parsing for the streaming chat-completions protocol.
//!
//! Tool invocations may arrive split across many fragments. Each fragment
//! carries a stream-local `index`; reassembly happens in an explicit
//! accumulator keyed by that index, preserving first-seen order.

use std::collections::HashMap;

use serde_json::Value;

use super::streaming::{FinishReason, StreamPart};
use super::types::ToolCall;

/// Accumulates the fragments of one in-flight tool call.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    fn complete(self, index: usize) -> ToolCall {
        let id = if self.id.is_empty() {
            format!("call-{index}")
        } else {
            self.id
        };
        ToolCall {
            id,
            name: self.name,
            arguments: self.arguments,
        }
    }
}

/// Splits a byte stream into SSE `data:` payloads.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buf: String,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every complete `data:` payload it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut payloads = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(payload) = line.strip_prefix("data:") {
                payloads.push(payload.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Incremental parser for chat-completions stream events.
#[derive(Debug, Default)]
pub struct ChatStreamParser {
    accumulators: HashMap<usize, ToolCallAccumulator>,
    order: Vec<usize>,
    saw_finish: bool,
}

impl ChatStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an explicit finish signal has been parsed.
    pub fn saw_finish(&self) -> bool {
        self.saw_finish
    }

    /// Parse one decoded `data:` payload into zero or more stream parts.
    pub fn parse_event(&mut self, json: &Value) -> Vec<StreamPart> {
        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown model error");
            self.saw_finish = true;
            return vec![StreamPart::Error {
                error: message.to_string(),
            }];
        }

        let mut parts = Vec::new();
        let Some(choice) = json
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
        else {
            return parts;
        };

        if let Some(delta) = choice.get("delta") {
            if let Some(content) = delta.get("content").and_then(Value::as_str) {
                if !content.is_empty() {
                    parts.push(StreamPart::TextDelta {
                        delta: content.to_string(),
                    });
                }
            }

            if let Some(tool_calls) = delta.get("tool_calls").and_then(Value::as_array) {
                for fragment in tool_calls {
                    let index =
                        fragment.get("index").and_then(Value::as_u64).unwrap_or(0) as usize;
                    let is_new = !self.accumulators.contains_key(&index);
                    if is_new {
                        self.order.push(index);
                    }
                    let acc = self.accumulators.entry(index).or_default();

                    if let Some(id) = fragment.get("id").and_then(Value::as_str) {
                        acc.id = id.to_string();
                    }
                    if let Some(function) = fragment.get("function") {
                        if let Some(name) = function.get("name").and_then(Value::as_str) {
                            acc.name = name.to_string();
                        }
                        if let Some(args) = function.get("arguments").and_then(Value::as_str) {
                            acc.arguments.push_str(args);
                        }
                    }

                    if is_new {
                        parts.push(StreamPart::ToolCallStart {
                            id: if acc.id.is_empty() {
                                format!("call-{index}")
                            } else {
                                acc.id.clone()
                            },
                            name: acc.name.clone(),
                        });
                    }
                }
            }
        }

        if let Some(reason) = choice.get("finish_reason").and_then(Value::as_str) {
            self.saw_finish = true;
            match reason {
                "stop" | "end_turn" => parts.push(StreamPart::Finish {
                    reason: FinishReason::Stop,
                }),
                "tool_calls" => {
                    for tool_call in self.drain() {
                        parts.push(StreamPart::ToolCallComplete { tool_call });
                    }
                    parts.push(StreamPart::Finish {
                        reason: FinishReason::ToolCalls,
                    });
                }
                other => parts.push(StreamPart::Finish {
                    reason: FinishReason::Other(other.to_string()),
                }),
            }
        }

        parts
    }

    /// Complete every pending accumulator, in first-seen order.
    pub fn drain(&mut self) -> Vec<ToolCall> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|index| {
                self.accumulators
                    .remove(&index)
                    .map(|acc| acc.complete(index))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts_of(parser: &mut ChatStreamParser, payloads: &[Value]) -> Vec<StreamPart> {
        payloads
            .iter()
            .flat_map(|p| parser.parse_event(p))
            .collect()
    }

    #[test]
    fn text_deltas_pass_through_in_order() {
        let mut parser = ChatStreamParser::new();
        let parts = parts_of(
            &mut parser,
            &[
                json!({"choices": [{"delta": {"content": "Hel"}}]}),
                json!({"choices": [{"delta": {"content": "lo"}}]}),
                json!({"choices": [{"delta": {}, "finish_reason": "stop"}]}),
            ],
        );
        let text: String = parts
            .iter()
            .filter_map(|p| match p {
                StreamPart::TextDelta { delta } => Some(delta.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Hello");
        assert!(matches!(
            parts.last(),
            Some(StreamPart::Finish { reason: FinishReason::Stop })
        ));
    }

    #[test]
    fn interleaved_tool_call_fragments_reassemble_by_index() {
        let mut parser = ChatStreamParser::new();
        let parts = parts_of(
            &mut parser,
            &[
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 0, "id": "a", "function": {"name": "bash", "arguments": "{\"comm"}}
                ]}}]}),
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 1, "id": "b", "function": {"name": "bash", "arguments": "{\"command\": \"pwd\"}"}}
                ]}}]}),
                json!({"choices": [{"delta": {"tool_calls": [
                    {"index": 0, "function": {"arguments": "and\": \"ls\"}"}}
                ]}}]}),
                json!({"choices": [{"delta": {}, "finish_reason": "tool_calls"}]}),
            ],
        );

        let calls: Vec<&ToolCall> = parts
            .iter()
            .filter_map(|p| match p {
                StreamPart::ToolCallComplete { tool_call } => Some(tool_call),
                _ => None,
            })
            .collect();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[0].arguments, "{\"command\": \"ls\"}");
        assert_eq!(calls[1].id, "b");
        assert!(matches!(
            parts.last(),
            Some(StreamPart::Finish { reason: FinishReason::ToolCalls })
        ));
    }

    #[test]
    fn missing_call_id_synthesizes_one_from_the_index() {
        let mut parser = ChatStreamParser::new();
        parser.parse_event(&json!({"choices": [{"delta": {"tool_calls": [
            {"index": 2, "function": {"name": "bash", "arguments": "{}"}}
        ]}}]}));
        let calls = parser.drain();
        assert_eq!(calls[0].id, "call-2");
    }

    #[test]
    fn error_payloads_become_error_parts() {
        let mut parser = ChatStreamParser::new();
        let parts = parser.parse_event(&json!({"error": {"message": "model overloaded"}}));
        assert!(matches!(
            parts.first(),
            Some(StreamPart::Error { error }) if error == "model overloaded"
        ));
    }

    #[test]
    fn line_buffer_reassembles_split_payloads() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: {\"a\"").is_empty());
        let payloads = buf.push(b": 1}\r\n\r\ndata: [DONE]\n");
        assert_eq!(payloads, vec!["{\"a\": 1}", "[DONE]"]);
    }
}
