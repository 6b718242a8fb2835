//! Per-agent wake policy: should this agent respond to the message that just
//! completed?

use std::collections::HashSet;

use crate::chat::{ActivationMode, AgentProfile, Conversation, Message};
use crate::mention::trigger_mentions;

/// Decide whether `agent` should respond to `message`.
///
/// Rules, first match wins:
/// 1. never respond to your own message;
/// 2. explicit addressing is exclusive: when the speaker trigger-mentions
///    specific roster agents, only those agents may respond;
/// 3. "awaiting a reply": the agent's most recent prior message
///    trigger-mentioned the speaker of `message`;
/// 4. fall back to the agent's activation mode.
pub fn should_wake(agent: &AgentProfile, message: &Message, conversation: &Conversation) -> bool {
    if message.sender == agent.handle {
        return false;
    }

    // Mentions of the sender itself never count, and mentions of unknown or
    // human handles are not agent mentions.
    let mut mentions: HashSet<String> = trigger_mentions(&message.content).into_iter().collect();
    mentions.remove(&message.sender);
    let agent_mentions: HashSet<&String> = mentions
        .iter()
        .filter(|m| conversation.roster().contains(m.as_str()))
        .collect();

    if !agent_mentions.is_empty() {
        return agent_mentions.contains(&agent.handle);
    }

    if let Some(last) = conversation.last_from(&agent.handle) {
        let mut my_mentions: HashSet<String> =
            trigger_mentions(&last.content).into_iter().collect();
        my_mentions.remove(&agent.handle);
        if my_mentions.contains(&message.sender) {
            return true;
        }
    }

    agent.activation == ActivationMode::Always
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::profile::tests_support::{always_agent, mention_agent};
    use crate::chat::Roster;

    fn conversation() -> Conversation {
        let roster =
            Roster::new(vec![always_agent("@data"), mention_agent("@code")]).unwrap();
        Conversation::new(roster)
    }

    #[test]
    fn always_agent_wakes_without_mentions() {
        let conv = conversation();
        let msg = Message::text("@user", "what's the status?");
        assert!(should_wake(conv.roster().get("@data").unwrap(), &msg, &conv));
    }

    #[test]
    fn never_responds_to_own_message() {
        let conv = conversation();
        let msg = Message::text("@data", "looking into it");
        assert!(!should_wake(conv.roster().get("@data").unwrap(), &msg, &conv));
    }

    #[test]
    fn explicit_addressing_is_exclusive() {
        let conv = conversation();
        let msg = Message::text("@user", "@code? please fix the bug");
        assert!(!should_wake(conv.roster().get("@data").unwrap(), &msg, &conv));
        assert!(should_wake(conv.roster().get("@code").unwrap(), &msg, &conv));
    }

    #[test]
    fn mention_of_unknown_handle_is_not_exclusive() {
        let conv = conversation();
        let msg = Message::text("@user", "@nobody? are you there");
        // No roster agent was addressed, so the always agent still wakes.
        assert!(should_wake(conv.roster().get("@data").unwrap(), &msg, &conv));
    }

    #[test]
    fn self_mention_by_the_sender_does_not_address_anyone() {
        let conv = conversation();
        let msg = Message::text("@code", "as @code? I already said so");
        assert!(should_wake(conv.roster().get("@data").unwrap(), &msg, &conv));
    }

    #[test]
    fn awaiting_reply_wakes_a_mention_only_agent() {
        let mut conv = conversation();
        conv.push(Message::text("@code", "done, @data? can you verify"));
        let msg = Message::text("@data", "numbers look right");
        assert!(should_wake(conv.roster().get("@code").unwrap(), &msg, &conv));
    }

    #[test]
    fn awaiting_reply_checks_only_the_most_recent_own_message() {
        let mut conv = conversation();
        conv.push(Message::text("@code", "@data? can you verify"));
        conv.push(Message::text("@code", "actually never mind"));
        let msg = Message::text("@data", "numbers look right");
        assert!(!should_wake(conv.roster().get("@code").unwrap(), &msg, &conv));
    }

    #[test]
    fn mention_only_agent_stays_asleep_by_default() {
        let conv = conversation();
        let msg = Message::text("@user", "anyone around?");
        assert!(!should_wake(conv.roster().get("@code").unwrap(), &msg, &conv));
    }
}
