//! Control response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ClockView;

/// Response to a control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub display: String,
    pub clock: ClockView,
}

impl ControlResponse {
    /// Create a new control response
    pub fn new(status: &str, message: String, clock: ClockView) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            display: clock.display(),
            clock,
        }
    }

    /// Response for a control that left the displayed clock running
    pub fn running(message: String, clock: ClockView) -> Self {
        Self::new("running", message, clock)
    }

    /// Response for a control that left the displayed clock stopped
    pub fn idle(message: String, clock: ClockView) -> Self {
        Self::new("idle", message, clock)
    }

    /// Response for a control refused by the UI policy
    pub fn ignored(message: String, clock: ClockView) -> Self {
        Self::new("ignored", message, clock)
    }

    /// Response matching the displayed clock's running flag
    pub fn for_view(message: String, clock: ClockView) -> Self {
        if clock.selected_running() {
            Self::running(message, clock)
        } else {
            Self::idle(message, clock)
        }
    }

    /// Plain-text rendering for the terminal
    pub fn to_text(&self) -> String {
        format!("{}  ({})", self.clock.status_line(), self.message)
    }
}

/// Status response with last-action information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub clock: ClockView,
    pub display: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl StatusResponse {
    pub fn to_text(&self) -> String {
        let last = match (&self.last_action, &self.last_action_time) {
            (Some(action), Some(at)) => format!("{} at {}", action, at.format("%H:%M:%S")),
            _ => "none".to_string(),
        };
        format!(
            "{}\n  duration {}s, last action {}",
            self.clock.status_line(),
            self.clock.duration_ms / 1000,
            last
        )
    }
}
