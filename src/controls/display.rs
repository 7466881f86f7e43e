//! Live status line for interactive terminals

use std::{
    io::{self, IsTerminal, Write},
    sync::Arc,
};
use tracing::{debug, warn};

use crate::state::AppState;

/// Redraw the status line whenever the visible text changes.
///
/// Does nothing when stdout is not a terminal.
pub async fn display_task(state: Arc<AppState>) {
    if !io::stdout().is_terminal() {
        debug!("stdout is not a terminal, live display disabled");
        return;
    }

    let mut state_rx = state.subscribe();
    let mut last_line = String::new();

    while state_rx.changed().await.is_ok() {
        let line = match state.get_view() {
            Ok(view) => view.status_line(),
            Err(e) => {
                warn!("Failed to read clock for display: {}", e);
                continue;
            }
        };
        if line == last_line {
            continue;
        }

        let mut stdout = io::stdout().lock();
        if write!(stdout, "\r{}\x1b[K", line).and_then(|_| stdout.flush()).is_err() {
            break;
        }
        last_line = line;
    }
}
