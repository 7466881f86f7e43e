//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::services::Permission;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "workout-clock")]
#[command(about = "A drift-free workout timer and stopwatch that survives restarts")]
#[command(version)]
pub struct Config {
    /// Directory holding the persisted clock state
    #[arg(long, default_value = ".workout-clock")]
    pub state_dir: PathBuf,

    /// Keep state in memory only; nothing survives exit
    #[arg(long)]
    pub ephemeral: bool,

    /// Display refresh interval in milliseconds
    #[arg(long, default_value = "16")]
    pub frame_interval_ms: u64,

    /// Notification capability of this terminal
    #[arg(long, value_enum, default_value = "granted")]
    pub notifications: Permission,

    /// Print control responses as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Tick scheduler cadence, at least one millisecond
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
