//! Duration adjuster: fixed-step changes to the countdown length

use crate::state::{AppState, ClockView};

/// Step applied by the increment and decrement controls
pub const STEP_SECONDS: i64 = 15;

/// Lengthen the countdown by one step
pub fn increment(state: &AppState) -> Result<ClockView, String> {
    state.adjust_duration(STEP_SECONDS)
}

/// Shorten the countdown by one step
pub fn decrement(state: &AppState) -> Result<ClockView, String> {
    state.adjust_duration(-STEP_SECONDS)
}

/// Parse a free-form step such as `+15`, `-30` or `45`.
///
/// Anything that is not a finite number of seconds counts as 0, so a bad
/// input can never reach the deadline arithmetic.
pub fn parse_step(input: &str) -> i64 {
    let input = input.trim();
    let input = input.strip_prefix('+').unwrap_or(input);
    if let Ok(seconds) = input.parse::<i64>() {
        return seconds;
    }
    match input.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => seconds.round() as i64,
        _ => 0,
    }
}
