//! Combined clock state: two independent sub-clocks and a view selector

use serde::{Deserialize, Serialize};

use super::{StopwatchState, TimerState};
use crate::format;

/// Which sub-clock the display shows. Switching never stops either clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockMode {
    #[default]
    Timer,
    Stopwatch,
}

impl ClockMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockMode::Timer => "Timer",
            ClockMode::Stopwatch => "Stopwatch",
        }
    }
}

/// Full clock state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClockState {
    pub mode: ClockMode,
    pub timer: TimerState,
    pub stopwatch: StopwatchState,
}

impl ClockState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if either sub-clock is running
    pub fn any_running(&self) -> bool {
        self.timer.is_running() || self.stopwatch.is_running()
    }

    /// Read-only projection of both sub-clocks at `now`
    pub fn view(&self, now: i64) -> ClockView {
        ClockView {
            mode: self.mode,
            duration_ms: self.timer.duration_ms,
            remaining_ms: self.timer.remaining_at(now),
            timer_running: self.timer.is_running(),
            timer_expired: self.timer.is_expired(),
            elapsed_ms: self.stopwatch.elapsed_at(now),
            stopwatch_running: self.stopwatch.is_running(),
        }
    }
}

/// Display values of both sub-clocks at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockView {
    pub mode: ClockMode,
    pub duration_ms: i64,
    pub remaining_ms: i64,
    pub timer_running: bool,
    pub timer_expired: bool,
    pub elapsed_ms: i64,
    pub stopwatch_running: bool,
}

impl ClockView {
    /// Formatted value of the selected sub-clock
    pub fn display(&self) -> String {
        match self.mode {
            ClockMode::Timer => format::countdown(self.remaining_ms),
            ClockMode::Stopwatch => format::stopwatch(self.elapsed_ms),
        }
    }

    /// Whether the selected sub-clock is running
    pub fn selected_running(&self) -> bool {
        match self.mode {
            ClockMode::Timer => self.timer_running,
            ClockMode::Stopwatch => self.stopwatch_running,
        }
    }

    /// One status line: selected clock first, the other one after it
    pub fn status_line(&self) -> String {
        let marker = |running: bool| if running { "running" } else { "idle" };
        let timer_marker = if self.timer_expired { "finished" } else { marker(self.timer_running) };
        match self.mode {
            ClockMode::Timer => format!(
                "[Timer] {} ({})  | Stopwatch {} ({})",
                format::countdown(self.remaining_ms),
                timer_marker,
                format::stopwatch(self.elapsed_ms),
                marker(self.stopwatch_running),
            ),
            ClockMode::Stopwatch => format!(
                "[Stopwatch] {} ({})  | Timer {} ({})",
                format::stopwatch(self.elapsed_ms),
                marker(self.stopwatch_running),
                format::countdown(self.remaining_ms),
                timer_marker,
            ),
        }
    }
}
