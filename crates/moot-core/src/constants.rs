//! Fixed configuration constants shared across the core.

use std::time::Duration;

/// Reserved handle for the human participant. Never appears in a roster.
pub const HUMAN_HANDLE: &str = "@user";

/// Token an agent emits to decline the current exchange.
pub const PASS_TOKEN: &str = "[PASS]";

/// Maximum model-call/tool-call rounds within a single agent turn.
pub const MAX_TOOL_ROUNDS: usize = 10;

/// How many recent messages the context builder serializes for the model.
pub const CONTEXT_WINDOW_MESSAGES: usize = 50;

/// Character cap on a single tool result embedded under `full` visibility.
pub const FULL_TOOL_OUTPUT_CAP: usize = 500;

/// Character cap on the command line shown under `summary` visibility.
pub const SUMMARY_COMMAND_CAP: usize = 80;

/// Output lines shown under `summary` visibility.
pub const SUMMARY_RESULT_LINES: usize = 3;

/// Sandbox output above this length is clamped to head + tail.
pub const SANDBOX_OUTPUT_CAP: usize = 10_000;
pub const SANDBOX_OUTPUT_HEAD: usize = 5_000;
pub const SANDBOX_OUTPUT_TAIL: usize = 2_000;

/// Default wall-clock limit for one sandboxed command.
pub const DEFAULT_SANDBOX_TIMEOUT: Duration = Duration::from_secs(30);

/// Abort a model stream that produces no data for this long.
pub const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
