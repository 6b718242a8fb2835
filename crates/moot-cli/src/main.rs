//! Moot - a shared conversation floor for multiple LLM agents.
//!
//! Several independently-configured agents share one message thread, decide
//! turn by turn who speaks next, and can run commands in a shared docker
//! sandbox. The CLI is a thin presentation layer over `moot-core`: it reads
//! the human's input, renders the core's event stream, and nothing else.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod init;
mod render;
mod repl;

/// Moot - multi-agent conversation floor
#[derive(Parser)]
#[command(name = "moot")]
#[command(about = "A shared conversation floor for multiple LLM agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive conversation (the default)
    Run {
        /// Manifest path; defaults to ./moot.yaml when present, otherwise
        /// the built-in two-agent roster
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Run a single prompt through the floor, then exit
        #[arg(short, long)]
        prompt: Option<String>,

        /// Log scheduler decisions and transport detail
        #[arg(long)]
        debug: bool,
    },

    /// Write a starter manifest
    Init {
        #[arg(default_value = "moot.yaml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init { path }) => init::write_starter(&path),
        Some(Commands::Run {
            config,
            prompt,
            debug,
        }) => {
            init_logging(debug)?;
            repl::run(config, prompt).await
        }
        None => {
            init_logging(false)?;
            repl::run(None, None).await
        }
    }
}

/// Initialize logging to file - stdout belongs to the conversation.
///
/// The debug flag is threaded through here as an explicit filter level, not
/// a process-wide mutable read by the core.
fn init_logging(debug: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("moot")
        .join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_file = std::fs::File::create(log_dir.join("moot.log"))?;

    let default_level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
