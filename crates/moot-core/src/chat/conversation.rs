//! The shared message thread.

use uuid::Uuid;

use super::{Message, Roster};

/// Ordered, append-only message history plus the fixed roster.
///
/// Insertion order is the only ordering signal the scheduler relies on. The
/// conversation is the sole owner of its messages; only the exchange loop
/// appends to it.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    roster: Roster,
}

impl Conversation {
    pub fn new(roster: Roster) -> Self {
        Self {
            messages: Vec::new(),
            roster,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The most recent `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// The most recent message from `handle`, scanning backward.
    pub fn last_from(&self, handle: &str) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.sender == handle)
    }

    /// Position of a message in the thread, by id.
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }
}
