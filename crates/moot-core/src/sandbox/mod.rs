//! Sandboxed command execution.
//!
//! Execution never fails at the type level: timeouts and failures come back
//! as sentinel strings so the model can see them and adjust, per the error
//! design. `[no output]` is distinct from a failure sentinel.

pub mod docker;

use std::time::Duration;

use async_trait::async_trait;

use crate::constants::{SANDBOX_OUTPUT_CAP, SANDBOX_OUTPUT_HEAD, SANDBOX_OUTPUT_TAIL};

pub use docker::DockerSandbox;

/// Sentinel returned when a command produced nothing on either stream.
pub const NO_OUTPUT: &str = "[no output]";

/// Runs an opaque shell command and returns its combined output.
#[async_trait]
pub trait SandboxExecutor: Send + Sync {
    /// Execute `command`, blocking the caller up to `timeout`. Returns the
    /// concatenated stdout + stderr, clamped and trimmed, or a sentinel.
    async fn execute(&self, command: &str, timeout: Duration) -> String;
}

/// Build a failure sentinel.
pub fn failure(message: impl std::fmt::Display) -> String {
    format!("[error: {message}]")
}

/// Whether an output string is a failure sentinel.
pub fn is_failure(output: &str) -> bool {
    output.starts_with("[error:")
}

/// Clamp raw command output: over the cap, keep the head and tail and elide
/// the middle with a marker; always whitespace-trim; empty becomes the
/// `NO_OUTPUT` sentinel.
pub fn clamp_output(raw: &str) -> String {
    let clamped = if raw.len() > SANDBOX_OUTPUT_CAP {
        let head_end = floor_char_boundary(raw, SANDBOX_OUTPUT_HEAD);
        let tail_start = ceil_char_boundary(raw, raw.len() - SANDBOX_OUTPUT_TAIL);
        format!(
            "{}\n... [truncated] ...\n{}",
            &raw[..head_end],
            &raw[tail_start..]
        )
    } else {
        raw.to_string()
    };

    let trimmed = clamped.trim();
    if trimmed.is_empty() {
        NO_OUTPUT.to_string()
    } else {
        trimmed.to_string()
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut boundary = index.min(text.len());
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    boundary
}

fn ceil_char_boundary(text: &str, index: usize) -> usize {
    let mut boundary = index.min(text.len());
    while boundary < text.len() && !text.is_char_boundary(boundary) {
        boundary += 1;
    }
    boundary
}
