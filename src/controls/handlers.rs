//! Control handlers

use tracing::{debug, error};

use super::{
    commands::{Command, HELP},
    responses::{ControlResponse, StatusResponse},
};
use crate::state::{AppState, ClockMode};

/// What the host should do after a control
#[derive(Debug, Clone)]
pub enum Reply {
    Control(ControlResponse),
    Status(StatusResponse),
    Help(&'static str),
    Quit,
}

/// Dispatch one control to the store.
///
/// Start, pause and reset act on the displayed clock. Duration changes are
/// only accepted while the countdown is displayed and stopped, like the
/// increment buttons of the reference UI; the store itself accepts them at
/// any time.
pub fn handle_command(state: &AppState, command: Command) -> Result<Reply, String> {
    let mode = state.get_clock_state()?.mode;

    let response = match command {
        Command::Mode(selected) => {
            let view = state.set_mode(selected)?;
            ControlResponse::for_view(format!("{} selected", selected.as_str()), view)
        }
        Command::Start => {
            let view = match mode {
                ClockMode::Timer => state.start_timer()?,
                ClockMode::Stopwatch => state.start_stopwatch()?,
            };
            ControlResponse::for_view(format!("{} started", mode.as_str()), view)
        }
        Command::Pause => {
            let view = match mode {
                ClockMode::Timer => state.pause_timer()?,
                ClockMode::Stopwatch => state.pause_stopwatch()?,
            };
            ControlResponse::for_view(format!("{} paused", mode.as_str()), view)
        }
        Command::Reset => {
            let view = match mode {
                ClockMode::Timer => state.reset_timer()?,
                ClockMode::Stopwatch => state.reset_stopwatch()?,
            };
            ControlResponse::for_view(format!("{} reset", mode.as_str()), view)
        }
        Command::Adjust(delta_seconds) => adjust_handler(state, mode, delta_seconds)?,
        Command::Status => return status_handler(state).map(Reply::Status),
        Command::Help => return Ok(Reply::Help(HELP)),
        Command::Quit => return Ok(Reply::Quit),
        Command::Unknown(input) => {
            debug!("Unknown control: {}", input);
            ControlResponse::ignored(format!("unknown control '{}', try 'help'", input), state.get_view()?)
        }
    };

    Ok(Reply::Control(response))
}

fn adjust_handler(state: &AppState, mode: ClockMode, delta_seconds: i64) -> Result<ControlResponse, String> {
    let view = state.get_view()?;
    if mode != ClockMode::Timer {
        return Ok(ControlResponse::ignored(
            "duration applies to the timer, select it first".to_string(),
            view,
        ));
    }
    if view.timer_running {
        return Ok(ControlResponse::ignored(
            "duration is locked while the timer runs".to_string(),
            view,
        ));
    }

    let view = state.adjust_duration(delta_seconds)?;
    Ok(ControlResponse::idle(
        format!("duration {}s", view.duration_ms / 1000),
        view,
    ))
}

/// Build the status response
pub fn status_handler(state: &AppState) -> Result<StatusResponse, String> {
    let clock = state.get_view().map_err(|e| {
        error!("Failed to get clock state: {}", e);
        e
    })?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(StatusResponse {
        display: clock.display(),
        clock,
        last_action,
        last_action_time,
    })
}
