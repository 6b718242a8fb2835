//! The interactive loop: read the human's line, run one exchange, repeat.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use moot_core::chat::{Conversation, Message, Roster};
use moot_core::config::MootConfig;
use moot_core::constants::HUMAN_HANDLE;
use moot_core::model::HttpChatTransport;
use moot_core::orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorServices};
use moot_core::sandbox::DockerSandbox;

use crate::render::Renderer;

pub async fn run(config_path: Option<PathBuf>, prompt: Option<String>) -> Result<()> {
    let config = load_config(config_path.as_deref()).await?;
    let roster = config.resolve_roster()?;
    if roster.is_empty() {
        bail!("no agents configured");
    }

    let mut renderer = Renderer::new(roster.handles());
    banner(&config, &roster, &renderer);

    let sandbox = Arc::new(DockerSandbox::new(
        &config.sandbox.image,
        config.sandbox.dockerfile_dir.clone(),
        config.sandbox.workspace.clone(),
    ));
    let needs_sandbox = roster.iter().any(|a| a.tools_enabled);
    if needs_sandbox {
        let short = sandbox
            .start()
            .await
            .context("sandbox executor unavailable")?;
        renderer.system(&format!("sandbox started ({short})"));
    }

    let orchestrator = Orchestrator::new(
        OrchestratorServices {
            transport: Arc::new(HttpChatTransport::new()),
            sandbox: sandbox.clone(),
        },
        OrchestratorConfig {
            sandbox_timeout: config.sandbox_timeout(),
            ..OrchestratorConfig::default()
        },
    );
    let mut conversation = Conversation::new(roster);

    let one_shot = prompt.is_some();
    let mut pending = prompt;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = if let Some(initial) = pending.take() {
            println!();
            renderer.label(HUMAN_HANDLE);
            println!("{initial}");
            initial
        } else {
            if one_shot {
                break;
            }
            println!();
            renderer.label(HUMAN_HANDLE);
            let line = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    println!();
                    renderer.system("interrupted");
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else {
                break; // EOF
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            line
        };

        match input.as_str() {
            "/quit" => break,
            "/clear" => {
                conversation.clear();
                renderer.system("conversation cleared");
                continue;
            }
            _ => {}
        }

        conversation.push(Message::text(HUMAN_HANDLE, input));

        // ctrl-c during the exchange aborts the in-flight turn and hands
        // the floor back; the conversation itself survives.
        let cancel = CancellationToken::new();
        let interrupt = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            }
        });

        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        tokio::join!(
            async {
                orchestrator
                    .run_exchange(&mut conversation, &event_tx, &cancel)
                    .await;
                drop(event_tx);
            },
            async {
                while let Some(event) = event_rx.recv().await {
                    renderer.handle_event(event);
                }
            }
        );

        interrupt.abort();
        if cancel.is_cancelled() {
            println!();
            renderer.system("interrupted, back to you");
        }
    }

    if needs_sandbox {
        sandbox.shutdown().await;
    }
    println!();
    renderer.system("goodbye");
    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<MootConfig> {
    match path {
        Some(path) => MootConfig::load(path).await,
        None => {
            let default = Path::new("moot.yaml");
            if default.exists() {
                MootConfig::load(default).await
            } else {
                Ok(MootConfig::builtin())
            }
        }
    }
}

fn banner(config: &MootConfig, roster: &Roster, renderer: &Renderer) {
    let rule = "=".repeat(50);
    println!("{}", rule.clone().bold());
    println!(
        "{}",
        format!("moot - {}", config.name.as_deref().unwrap_or("conversation floor")).bold()
    );
    if let Some(description) = &config.description {
        println!("{}", description.clone().dim());
    }
    let agents = roster
        .handles()
        .map(|h| h.to_string().with(renderer.color(h)).to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("Agents: {agents}");
    println!("Type {} to exit, {} to reset", "/quit".bold(), "/clear".bold());
    println!("{}", rule.bold());
}
