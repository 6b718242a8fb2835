//! Streaming HTTP client for OpenAI-compatible chat-completions endpoints.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::TransportError;
use super::sse::{ChatStreamParser, SseLineBuffer};
use super::streaming::{FinishReason, StreamPart};
use super::types::{bash_tool_spec, ChatRequest};
use super::ChatTransport;

/// Shared reqwest-backed transport. Per-agent endpoint, model, credential,
/// and sampling settings travel with each request.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: reqwest::Client,
}

impl HttpChatTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpChatTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<mpsc::UnboundedReceiver<StreamPart>, TransportError> {
        let url = format!(
            "{}/chat/completions",
            request.endpoint.trim_end_matches('/')
        );
        debug!(model = %request.model, messages = request.messages.len(), %url, "starting chat stream");

        let mut body = json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "stream": true,
        });
        if request.tools_enabled {
            body["tools"] = bash_tool_spec();
        }

        let mut http = self.client.post(&url).json(&body);
        if let Some(key) = &request.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!(%status, "chat stream request rejected");
            return Err(TransportError::Status { status, body });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut lines = SseLineBuffer::new();
            let mut parser = ChatStreamParser::new();

            'read: while let Some(chunk) = stream.next().await {
                let bytes: bytes::Bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx.send(StreamPart::Error {
                            error: format!("stream read error: {e}"),
                        });
                        return;
                    }
                };

                for payload in lines.push(&bytes) {
                    if payload == "[DONE]" {
                        break 'read;
                    }
                    let event = match serde_json::from_str::<Value>(&payload) {
                        Ok(event) => event,
                        Err(e) => {
                            let _ = tx.send(StreamPart::Error {
                                error: format!("malformed stream payload: {e}"),
                            });
                            return;
                        }
                    };
                    for part in parser.parse_event(&event) {
                        let finished = matches!(part, StreamPart::Finish { .. });
                        if tx.send(part).is_err() {
                            // Consumer is gone (turn aborted); stop reading
                            // so the connection drops too.
                            return;
                        }
                        if finished {
                            break 'read;
                        }
                    }
                }
            }

            // Some providers close the stream without a finish_reason; flush
            // whatever reassembled so the consumer still gets a terminal part.
            if !parser.saw_finish() {
                let pending = parser.drain();
                if pending.is_empty() {
                    let _ = tx.send(StreamPart::Finish {
                        reason: FinishReason::Stop,
                    });
                } else {
                    for tool_call in pending {
                        let _ = tx.send(StreamPart::ToolCallComplete { tool_call });
                    }
                    let _ = tx.send(StreamPart::Finish {
                        reason: FinishReason::ToolCalls,
                    });
                }
            }
        });

        Ok(rx)
    }
}
