//! Agent profiles and the roster.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::constants::HUMAN_HANDLE;

/// When an agent takes the floor without being explicitly addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// Responds to any message it isn't excluded from.
    Always,
    /// Only responds when trigger-mentioned (or awaiting a reply it asked for).
    #[default]
    #[serde(rename = "mention")]
    MentionOnly,
}

/// How much of OTHER agents' tool activity this agent sees in its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolVisibility {
    /// Complete command and output (output capped with a marker).
    #[default]
    Full,
    /// First line of the command, first few lines of output.
    Summary,
    /// Text content only.
    None,
}

/// Configuration for one LLM agent. Loaded once at startup, read-only after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique handle, `@`-prefixed by convention (e.g. `@data`).
    pub handle: String,
    /// Model identifier passed to the chat-completions endpoint.
    pub model: String,
    /// OpenAI-compatible API base URL.
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// System prompt text.
    pub instructions: String,
    #[serde(default)]
    pub activation: ActivationMode,
    #[serde(default)]
    pub tools_enabled: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub tool_visibility: ToolVisibility,
}

fn default_temperature() -> f32 {
    0.7
}

/// The fixed, ordered set of agents sharing one conversation.
///
/// Declared order is meaningful: the scheduler iterates it when deciding who
/// wakes. Handles are unique and the human handle never appears here.
#[derive(Debug, Clone)]
pub struct Roster {
    agents: Vec<AgentProfile>,
}

impl Roster {
    pub fn new(agents: Vec<AgentProfile>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for agent in &agents {
            if agent.handle.is_empty() {
                bail!("agent handle must not be empty");
            }
            if agent.handle == HUMAN_HANDLE {
                bail!("agent handle {HUMAN_HANDLE} is reserved for the human");
            }
            if !seen.insert(agent.handle.as_str()) {
                bail!("duplicate agent handle: {}", agent.handle);
            }
        }
        Ok(Self { agents })
    }

    pub fn get(&self, handle: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|a| a.handle == handle)
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.get(handle).is_some()
    }

    /// Agents in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentProfile> {
        self.agents.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.handle.as_str())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
