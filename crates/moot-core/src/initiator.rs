//! Initiator tracking: who summoned the current speaker?

use crate::chat::{Conversation, Message};
use crate::mention::mentions_trigger;

/// Find the handle that most recently trigger-mentioned `message`'s sender,
/// scanning backward from the entry immediately before `message`.
///
/// The scan stops at the sender's own previous turn: a trigger from before
/// the speaker last spoke does not carry forward. This bounds the search to
/// the current conversational thread instead of walking unboundedly into
/// history.
pub fn find_initiator<'a>(message: &Message, conversation: &'a Conversation) -> Option<&'a str> {
    let messages = conversation.messages();
    let end = conversation
        .position_of(message.id)
        .unwrap_or(messages.len());

    for prior in messages[..end].iter().rev() {
        if mentions_trigger(&prior.content, &message.sender) {
            return Some(prior.sender.as_str());
        }
        if prior.sender == message.sender {
            return None;
        }
    }
    None
}
