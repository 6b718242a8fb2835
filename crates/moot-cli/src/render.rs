//! Maps `RoomEvent`s to styled terminal output.

use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::style::{Color, Stylize};
use moot_core::constants::HUMAN_HANDLE;
use moot_core::events::RoomEvent;

const MAX_RESULT_LINES: usize = 15;

const PALETTE: [Color; 5] = [
    Color::Magenta,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Red,
];

pub struct Renderer {
    colors: HashMap<String, Color>,
}

impl Renderer {
    /// Assign each agent a stable color by roster order; the human is cyan.
    pub fn new<'a>(handles: impl Iterator<Item = &'a str>) -> Self {
        let mut colors = HashMap::new();
        colors.insert(HUMAN_HANDLE.to_string(), Color::Cyan);
        for (i, handle) in handles.enumerate() {
            colors.insert(handle.to_string(), PALETTE[i % PALETTE.len()]);
        }
        Self { colors }
    }

    pub fn color(&self, handle: &str) -> Color {
        self.colors.get(handle).copied().unwrap_or(Color::White)
    }

    /// Print a speaker label like `[@data]:` and leave the cursor on the line.
    pub fn label(&self, handle: &str) {
        print!("{} ", format!("[{handle}]:").with(self.color(handle)).bold());
        let _ = io::stdout().flush();
    }

    pub fn system(&self, text: &str) {
        println!("{}", format!("[system]: {text}").dim());
    }

    pub fn error(&self, text: &str) {
        println!("{}", format!("[error]: {text}").with(Color::Red).bold());
    }

    pub fn handle_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::TurnStarted { agent } => {
                println!();
                self.label(&agent);
            }
            RoomEvent::TextDelta { delta } => {
                print!("{delta}");
                let _ = io::stdout().flush();
            }
            RoomEvent::ToolCallStarted { .. } => {}
            RoomEvent::ToolExecuting { command } => {
                println!();
                println!("  {} {}", "$".dim(), command.bold());
            }
            RoomEvent::ToolResult { output, is_error } => {
                self.print_tool_result(&output, is_error);
            }
            RoomEvent::RoundLimitReached { rounds } => {
                println!();
                self.error(&format!("round limit ({rounds}) reached, ending the turn"));
            }
            RoomEvent::TransportError { error } => {
                println!();
                self.error(&error);
            }
            RoomEvent::AgentPassed { .. } => {}
            RoomEvent::TurnComplete { .. } => {
                println!();
            }
            RoomEvent::Notice { text } => {
                println!();
                self.system(&text);
            }
            RoomEvent::ExchangeComplete => {}
        }
    }

    fn print_tool_result(&self, output: &str, is_error: bool) {
        let lines: Vec<&str> = output.lines().collect();
        for line in lines.iter().take(MAX_RESULT_LINES) {
            let text = format!("  {line}");
            if is_error {
                println!("{}", text.with(Color::Red));
            } else {
                println!("{}", text.dim());
            }
        }
        if lines.len() > MAX_RESULT_LINES {
            println!(
                "{}",
                format!("  ... ({} more lines)", lines.len() - MAX_RESULT_LINES).dim()
            );
        }
    }
}
