//! Persisted clock snapshot

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    timer_state::{normalize_duration, DEFAULT_DURATION_MS},
    ClockMode, ClockState, StopwatchState, TimerState,
};

/// The whole clock state as written to storage after every mutation.
///
/// `end_at`/`start_at` are absolute epoch milliseconds and present only
/// while the corresponding clock runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockSnapshot {
    pub mode: ClockMode,
    pub duration_ms: i64,
    pub remaining_ms: i64,
    pub elapsed: i64,
    pub running_timer: bool,
    pub running_stopwatch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<i64>,
}

/// Outcome of restoring a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restored {
    pub state: ClockState,
    /// The countdown was running and its deadline passed while nobody watched
    pub expired_while_away: bool,
}

impl ClockSnapshot {
    /// Capture `state` with display values computed at `now`
    pub fn capture(state: &ClockState, now: i64) -> Self {
        Self {
            mode: state.mode,
            duration_ms: state.timer.duration_ms,
            remaining_ms: state.timer.remaining_at(now),
            elapsed: state.stopwatch.elapsed_at(now),
            running_timer: state.timer.is_running(),
            running_stopwatch: state.stopwatch.is_running(),
            end_at: state.timer.end_at,
            start_at: state.stopwatch.start_at,
        }
    }

    /// Parse a stored blob.
    ///
    /// Only malformed JSON is an error. Inside a JSON object every field falls
    /// back to its default on its own when missing or mistyped, and the older
    /// `clocktype` name is accepted for `mode`.
    pub fn parse(blob: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(blob)?;
        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);

        let mode = fields
            .get("mode")
            .or_else(|| fields.get("clocktype"))
            .and_then(|v| serde_json::from_value::<ClockMode>(v.clone()).ok())
            .unwrap_or_default();
        let duration_ms = millis(fields, "durationMs").unwrap_or(DEFAULT_DURATION_MS);

        Ok(Self {
            mode,
            duration_ms,
            remaining_ms: millis(fields, "remainingMs").unwrap_or(duration_ms),
            elapsed: millis(fields, "elapsed").unwrap_or(0),
            running_timer: flag(fields, "runningTimer"),
            running_stopwatch: flag(fields, "runningStopwatch"),
            end_at: millis(fields, "endAt"),
            start_at: millis(fields, "startAt"),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Rebuild the clock state at `now`.
    ///
    /// Running clocks are resumed from their anchors. A countdown whose
    /// deadline already passed comes back in the expired terminal state.
    pub fn restore(&self, now: i64) -> Restored {
        let duration_ms = normalize_duration(self.duration_ms);
        let mut timer = TimerState {
            duration_ms,
            remaining_ms: self.remaining_ms.clamp(0, duration_ms),
            end_at: None,
        };
        let mut expired_while_away = false;

        match (self.running_timer, self.end_at) {
            (true, Some(end_at)) if end_at <= now => {
                debug!("Restored countdown expired {}ms ago", now.saturating_sub(end_at));
                timer.remaining_ms = 0;
                expired_while_away = true;
            }
            (true, Some(end_at)) => {
                timer.end_at = Some(end_at);
                timer.remaining_ms = end_at.saturating_sub(now);
            }
            (true, None) => debug!("Snapshot marks countdown running without a deadline, restoring idle"),
            (false, _) => {}
        }

        let mut stopwatch = StopwatchState {
            elapsed_ms: self.elapsed.max(0),
            start_at: None,
        };
        if self.running_stopwatch {
            match self.start_at {
                Some(start_at) => {
                    stopwatch.start_at = Some(start_at);
                    stopwatch.elapsed_ms = stopwatch.elapsed_at(now);
                }
                None => debug!("Snapshot marks stopwatch running without an origin, restoring idle"),
            }
        }

        Restored {
            state: ClockState {
                mode: self.mode,
                timer,
                stopwatch,
            },
            expired_while_away,
        }
    }
}

impl Default for ClockSnapshot {
    fn default() -> Self {
        Self::capture(&ClockState::default(), 0)
    }
}

fn millis(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    let value = fields.get(key)?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
    })
}

fn flag(fields: &Map<String, Value>, key: &str) -> bool {
    fields.get(key).and_then(Value::as_bool).unwrap_or(false)
}
