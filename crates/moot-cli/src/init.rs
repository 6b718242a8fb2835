//! `moot init` - write a starter manifest.

use std::path::Path;

use anyhow::{bail, Context, Result};

const STARTER_MANIFEST: &str = r#"# Moot manifest. Run `moot` in this directory to use it.
name: analysis-floor
description: A data analyst that always listens, and a programmer woken by mention.

defaults:
  endpoint: http://localhost:11434/v1
  model: llama3

sandbox:
  image: moot-sandbox:latest
  # dockerfile_dir: ./sandbox     # build the image from here when missing
  # workspace: ./workspace        # copied into /workspace at startup
  timeout_secs: 30

agents:
  - handle: "@data"
    activation: always
    tools: true
    temperature: 0.7
    tool_visibility: summary
    instructions: |
      You are @data, a senior data analyst in a shared chatroom.
      @user is the human; @code is a programmer for heavier tasks.
      To request a response, write a handle followed by a question mark,
      e.g. "@code? can you chart this". Use your bash tool for quick
      exploration only; delegate multi-step work to @code?.
      When you have nothing to add, respond with exactly: [PASS]

  - handle: "@code"
    activation: mention
    tools: true
    temperature: 0.2
    tool_visibility: full
    instructions: |
      You are @code, an expert programmer in a shared chatroom.
      You have one tool: bash. Use it for everything - reading, writing,
      searching, running code. Keep responses short: do the work, show
      the result, stop.
"#;

pub fn write_starter(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("{} already exists", path.display());
    }
    std::fs::write(path, STARTER_MANIFEST)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    println!("edit the endpoints/models, then start a conversation with: moot");
    Ok(())
}
