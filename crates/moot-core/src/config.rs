//! YAML manifest loading and roster resolution.
//!
//! The manifest supplies the roster and conversation defaults once at
//! startup; the core treats the result as immutable input. A built-in roster
//! covers the no-manifest case.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::chat::{ActivationMode, AgentProfile, Roster, ToolVisibility};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1";
pub const DEFAULT_MODEL: &str = "llama3";
pub const DEFAULT_SANDBOX_IMAGE: &str = "moot-sandbox:latest";

/// Top-level manifest, usually `moot.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MootConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub agents: Vec<AgentEntry>,
    #[serde(default)]
    pub sandbox: SandboxSettings,
}

/// Conversation-wide defaults merged into agents that omit them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SandboxSettings {
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default)]
    pub dockerfile_dir: Option<PathBuf>,
    #[serde(default)]
    pub workspace: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            image: default_image(),
            dockerfile_dir: None,
            workspace: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_image() -> String {
    DEFAULT_SANDBOX_IMAGE.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// One agent as declared in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentEntry {
    pub handle: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub activation: ActivationMode,
    #[serde(default)]
    pub tools: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub tool_visibility: ToolVisibility,
}

fn default_temperature() -> f32 {
    0.7
}

impl MootConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The built-in two-agent roster used when no manifest exists: a lead
    /// analyst that always listens and a programmer woken by mention.
    pub fn builtin() -> Self {
        Self {
            name: Some("moot".to_string()),
            description: None,
            defaults: Defaults {
                endpoint: Some(DEFAULT_ENDPOINT.to_string()),
                model: Some(DEFAULT_MODEL.to_string()),
            },
            agents: vec![
                AgentEntry {
                    handle: "@data".to_string(),
                    model: None,
                    endpoint: None,
                    api_key: None,
                    instructions: DATA_INSTRUCTIONS.to_string(),
                    activation: ActivationMode::Always,
                    tools: true,
                    temperature: 0.7,
                    tool_visibility: ToolVisibility::Summary,
                },
                AgentEntry {
                    handle: "@code".to_string(),
                    model: None,
                    endpoint: None,
                    api_key: None,
                    instructions: CODE_INSTRUCTIONS.to_string(),
                    activation: ActivationMode::MentionOnly,
                    tools: true,
                    temperature: 0.2,
                    tool_visibility: ToolVisibility::Full,
                },
            ],
            sandbox: SandboxSettings::default(),
        }
    }

    /// Resolve manifest entries into profiles, merging defaults, and
    /// validate the roster. Errors here are fatal and reported before any
    /// conversation begins.
    pub fn resolve_roster(&self) -> Result<Roster> {
        let profiles = self
            .agents
            .iter()
            .map(|entry| AgentProfile {
                handle: entry.handle.clone(),
                model: entry
                    .model
                    .clone()
                    .or_else(|| self.defaults.model.clone())
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                endpoint: entry
                    .endpoint
                    .clone()
                    .or_else(|| self.defaults.endpoint.clone())
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                api_key: entry.api_key.clone(),
                instructions: entry.instructions.clone(),
                activation: entry.activation,
                tools_enabled: entry.tools,
                temperature: entry.temperature,
                tool_visibility: entry.tool_visibility,
            })
            .collect();
        Roster::new(profiles).context("invalid roster")
    }

    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_secs(self.sandbox.timeout_secs)
    }
}

const DATA_INSTRUCTIONS: &str = "\
You are @data, a senior data analyst sharing a chatroom with other agents.

Participants: @user is the human you are helping; @code is a programmer for \
heavier coding tasks. To request a response from someone, write their handle \
followed by a question mark, e.g. \"@code? can you chart this\".

Lead the analysis: understand what @user wants, break the work into steps, \
interpret results, and stay skeptical of empty data and suspicious numbers. \
You have a bash tool for quick exploration (head, wc -l, simple one-liners); \
delegate multi-step work and file writing to @code?.

Keep responses concise. You hear every message; when you have nothing to \
add, respond with exactly: [PASS]";

const CODE_INSTRUCTIONS: &str = "\
You are @code, an expert programmer sharing a chatroom with other agents.

Participants: @user is the human; @data is the analyst guiding the work. \
You have ONE tool: bash. Use it for everything - reading and writing files, \
listing, searching, and running code. Show your commands.

Keep responses short: do the work, show the result, stop. If a command \
fails, fix it or report the error.";

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MANIFEST: &str = r#"
name: analysis
defaults:
  endpoint: http://localhost:8080/v1
  model: test-model
sandbox:
  timeout_secs: 5
agents:
  - handle: "@data"
    activation: always
    tools: true
    tool_visibility: summary
    instructions: lead the analysis
  - handle: "@code"
    model: bigger-model
    temperature: 0.2
"#;

    #[test]
    fn defaults_merge_into_agents() {
        let config: MootConfig = serde_yaml::from_str(MANIFEST).unwrap();
        let roster = config.resolve_roster().unwrap();

        let data = roster.get("@data").unwrap();
        assert_eq!(data.model, "test-model");
        assert_eq!(data.endpoint, "http://localhost:8080/v1");
        assert_eq!(data.activation, ActivationMode::Always);
        assert!(data.tools_enabled);
        assert_eq!(data.tool_visibility, ToolVisibility::Summary);

        let code = roster.get("@code").unwrap();
        assert_eq!(code.model, "bigger-model");
        assert_eq!(code.activation, ActivationMode::MentionOnly);
        assert!(!code.tools_enabled);
        assert_eq!(code.temperature, 0.2);
    }

    #[test]
    fn duplicate_handles_are_rejected() {
        let yaml = r#"
agents:
  - handle: "@a"
  - handle: "@a"
"#;
        let config: MootConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.resolve_roster().is_err());
    }

    #[test]
    fn builtin_roster_resolves() {
        let roster = MootConfig::builtin().resolve_roster().unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(
            roster.get("@data").unwrap().activation,
            ActivationMode::Always
        );
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();
        let config = MootConfig::load(file.path()).await.unwrap();
        assert_eq!(config.name.as_deref(), Some("analysis"));
        assert_eq!(config.sandbox.timeout_secs, 5);
    }

    #[tokio::test]
    async fn missing_manifest_is_an_error() {
        let err = MootConfig::load(Path::new("/nonexistent/moot.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
