//! Deterministic next-speaker resolution.

use std::collections::HashSet;

use crate::chat::{Conversation, Message};
use crate::constants::HUMAN_HANDLE;
use crate::initiator::find_initiator;
use crate::mention::mentions_trigger;
use crate::wake::should_wake;

/// Where the conversation floor currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// No agent wants the floor; waiting on the human.
    AwaitingHuman,
    /// The named agent holds the floor.
    AgentTurn(String),
    /// The conversation is over (quit or cancelled).
    Done,
}

/// Pick the next speaker after `completed`, or `None` to hand control back to
/// the human.
///
/// Resolution order:
/// 1. an agent's explicit trigger-mention of the human wins outright;
/// 2. the initiator of the completed turn (when not the human) gets to
///    continue the thread it started, regardless of activation mode or pass
///    state;
/// 3. first roster agent, in declared order, not in `passed` and whose wake
///    policy says yes;
/// 4. nobody.
///
/// Read-only and fully deterministic for a fixed (message, conversation,
/// passed) triple.
pub fn resolve_next(
    completed: &Message,
    conversation: &Conversation,
    passed: &HashSet<String>,
) -> Option<String> {
    if completed.sender != HUMAN_HANDLE && mentions_trigger(&completed.content, HUMAN_HANDLE) {
        tracing::debug!(sender = %completed.sender, "speaker appealed to the human");
        return None;
    }

    if let Some(initiator) = find_initiator(completed, conversation) {
        if initiator != HUMAN_HANDLE {
            tracing::debug!(%initiator, "initiator continues the thread");
            return Some(initiator.to_string());
        }
    }

    for agent in conversation.roster().iter() {
        if passed.contains(&agent.handle) {
            tracing::debug!(agent = %agent.handle, "skipped: passed this exchange");
            continue;
        }
        if should_wake(agent, completed, conversation) {
            tracing::debug!(agent = %agent.handle, "wakes");
            return Some(agent.handle.clone());
        }
    }

    tracing::debug!("no agent wants the floor");
    None
}
