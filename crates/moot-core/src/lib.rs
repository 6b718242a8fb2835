//! Moot core — a shared conversation floor for multiple LLM agents.
//!
//! ## Scheduling (who speaks next)
//! - `mention` - trigger-mention extraction (`@name?`)
//! - `wake` - per-agent "should I respond" policy
//! - `initiator` - backward scan for whoever summoned the current speaker
//! - `scheduler` - deterministic next-speaker resolution + pass bookkeeping
//!
//! ## Running a turn
//! - `orchestrator` - drives one human-initiated exchange end to end
//! - `turn` - the bounded model-call/tool-call round loop for a single turn
//! - `context` - per-agent serialization of history for the model transport
//!
//! ## Collaborators
//! - `model` - streaming chat-completions transport (`ChatTransport`)
//! - `sandbox` - command execution behind `SandboxExecutor`
//! - `config` - YAML manifest loading and roster resolution
//!
//! Consumers (the CLI) receive `RoomEvent`s over an unbounded channel and map
//! them to their own presentation; the core never reads from the operator.

pub mod chat;
pub mod config;
pub mod constants;
pub mod context;
pub mod events;
pub mod initiator;
pub mod mention;
pub mod model;
pub mod orchestrator;
pub mod sandbox;
pub mod scheduler;
pub mod turn;
pub mod wake;

pub use chat::{ActivationMode, AgentProfile, Conversation, Message, Roster, ToolInvocation, ToolVisibility};
pub use config::MootConfig;
pub use events::RoomEvent;
pub use model::{ChatTransport, HttpChatTransport};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorServices};
pub use sandbox::{DockerSandbox, SandboxExecutor};
pub use scheduler::{resolve_next, SchedulerState};
