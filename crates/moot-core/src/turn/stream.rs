//! Stream processing for one round of a turn.
//!
//! Consumes `StreamPart`s from the transport, forwarding text fragments to
//! the event sink in arrival order while accumulating the round's content
//! and proposed tool calls.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::constants::STREAM_IDLE_TIMEOUT;
use crate::events::RoomEvent;
use crate::model::{FinishReason, StreamPart, ToolCall};

/// Everything one model response produced.
#[derive(Debug, Default)]
pub(crate) struct RoundResult {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish: Option<FinishReason>,
    pub error: Option<String>,
}

pub(crate) enum RoundOutcome {
    Complete(RoundResult),
    /// The operator interrupted mid-stream; partial content is discarded.
    Cancelled,
}

pub(crate) async fn process_round(
    mut rx: mpsc::UnboundedReceiver<StreamPart>,
    event_tx: &mpsc::UnboundedSender<RoomEvent>,
    cancel: &CancellationToken,
) -> RoundOutcome {
    let mut result = RoundResult::default();

    loop {
        let part = tokio::select! {
            _ = cancel.cancelled() => return RoundOutcome::Cancelled,
            recv = tokio::time::timeout(STREAM_IDLE_TIMEOUT, rx.recv()) => match recv {
                Ok(Some(part)) => part,
                Ok(None) => break,
                Err(_) => {
                    result.error = Some(format!(
                        "model stream produced no data for {}s",
                        STREAM_IDLE_TIMEOUT.as_secs()
                    ));
                    break;
                }
            },
        };

        match part {
            StreamPart::TextDelta { delta } => {
                result.text.push_str(&delta);
                let _ = event_tx.send(RoomEvent::TextDelta { delta });
            }
            StreamPart::ToolCallStart { id, name } => {
                let _ = event_tx.send(RoomEvent::ToolCallStarted { id, name });
            }
            StreamPart::ToolCallComplete { tool_call } => {
                result.tool_calls.push(tool_call);
            }
            StreamPart::Finish { reason } => {
                result.finish = Some(reason);
                break;
            }
            StreamPart::Error { error } => {
                result.error = Some(error);
                break;
            }
        }
    }

    RoundOutcome::Complete(result)
}
