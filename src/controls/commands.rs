//! Textual controls understood by the terminal host

use crate::{adjuster, state::ClockMode};

/// One user control
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select the displayed clock
    Mode(ClockMode),
    /// Start the displayed clock
    Start,
    /// Pause the displayed clock
    Pause,
    /// Reset the displayed clock
    Reset,
    /// Change the countdown length by whole seconds
    Adjust(i64),
    Status,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default().to_lowercase();
        let command = match head.as_str() {
            "timer" | "t" => Command::Mode(ClockMode::Timer),
            "stopwatch" | "sw" => Command::Mode(ClockMode::Stopwatch),
            "start" | "s" => Command::Start,
            "pause" | "p" => Command::Pause,
            "reset" | "r" => Command::Reset,
            "up" | "+" => Command::Adjust(adjuster::STEP_SECONDS),
            "down" | "-" => Command::Adjust(-adjuster::STEP_SECONDS),
            "adjust" => Command::Adjust(adjuster::parse_step(words.next().unwrap_or_default())),
            "status" | "?" => Command::Status,
            "help" | "h" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            step if step.starts_with('+') || step.starts_with('-') => {
                Command::Adjust(adjuster::parse_step(step))
            }
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}

/// Help text listing every control
pub const HELP: &str = "\
controls:
  timer | stopwatch      select the displayed clock
  start | pause | reset  act on the displayed clock
  up | down | +N | -N    change the countdown length (seconds)
  status                 show both clocks
  quit                   save and exit";
