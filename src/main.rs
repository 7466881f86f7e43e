//! Workout Clock - countdown timer and stopwatch for the terminal
//!
//! This is the main entry point for the workout-clock application.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use workout_clock::{
    config::Config,
    controls::{display_task, handle_command, status_handler, Command, Reply},
    services::{FileRepository, MemoryRepository, StateRepository, SystemClock, TerminalNotifier},
    state::AppState,
    tasks::{deadline_notifier_task, tick_scheduler_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so the clock display owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("workout_clock={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting workout-clock v{}", env!("CARGO_PKG_VERSION"));

    let repository: Arc<dyn StateRepository> = if config.ephemeral {
        info!("Using in-memory state, nothing will be saved");
        Arc::new(MemoryRepository::new())
    } else {
        let repository = FileRepository::new(&config.state_dir);
        info!("Persisting state under {}", repository.dir().display());
        Arc::new(repository)
    };

    // Create the clock store and restore the previous session
    let state = Arc::new(AppState::new(
        Arc::new(SystemClock),
        repository,
        Arc::new(TerminalNotifier::new(config.notifications)),
    ));
    state.load().map_err(anyhow::Error::msg)?;

    // Start the two schedulers and the live display
    tokio::spawn(tick_scheduler_task(Arc::clone(&state), config.frame_interval()));
    tokio::spawn(deadline_notifier_task(Arc::clone(&state)));
    tokio::spawn(display_task(Arc::clone(&state)));

    print_reply(&Reply::Status(status_handler(&state).map_err(anyhow::Error::msg)?), config.json)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };
                let Some(command) = Command::parse(&line) else {
                    continue;
                };
                match handle_command(&state, command) {
                    Ok(Reply::Quit) => break,
                    Ok(reply) => print_reply(&reply, config.json)?,
                    Err(e) => error!("Control failed: {}", e),
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    if let Err(e) = state.persist() {
        error!("Failed to save final state: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}

fn print_reply(reply: &Reply, json: bool) -> anyhow::Result<()> {
    let text = match (reply, json) {
        (Reply::Control(response), true) => serde_json::to_string(response)?,
        (Reply::Control(response), false) => response.to_text(),
        (Reply::Status(status), true) => serde_json::to_string(status)?,
        (Reply::Status(status), false) => status.to_text(),
        (Reply::Help(help), _) => help.to_string(),
        (Reply::Quit, _) => return Ok(()),
    };
    println!("{}", text);
    Ok(())
}
