//! Domain data model: messages, agent profiles, and the conversation.

pub mod conversation;
pub mod message;
pub mod profile;

pub use conversation::Conversation;
pub use message::{Message, ToolInvocation};
pub use profile::{ActivationMode, AgentProfile, Roster, ToolVisibility};
