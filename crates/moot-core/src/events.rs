//! Event protocol between the core and its operator.
//!
//! `RoomEvent` is the single source of truth for everything the exchange loop
//! and turn runner emit. The presentation layer (CLI) consumes these events
//! and maps them to its own display format; the core only ever writes.

use serde::Serialize;

/// Events emitted while an exchange runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    /// An agent took the floor.
    TurnStarted { agent: String },

    /// Text content delta from the model, in arrival order.
    TextDelta { delta: String },

    /// The model started streaming a tool call (arguments not yet complete).
    ToolCallStarted { id: String, name: String },

    /// A command is about to run in the sandbox.
    ToolExecuting { command: String },

    /// Sandbox execution finished.
    ToolResult { output: String, is_error: bool },

    /// The turn hit its round limit and was finalized forcibly. Non-fatal.
    RoundLimitReached { rounds: usize },

    /// The model transport failed; the turn was finalized with error content.
    TransportError { error: String },

    /// The agent declined this exchange.
    AgentPassed { agent: String },

    /// The agent's message was finalized and appended to the thread.
    TurnComplete { agent: String },

    /// Operator-facing notice (unknown speaker, cleared history, ...).
    Notice { text: String },

    /// The exchange ended; control is back with the human.
    ExchangeComplete,
}
