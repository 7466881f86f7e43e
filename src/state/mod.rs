//! State management module
//!
//! This module contains the clock records, the persisted snapshot and the
//! shared store that mutates them.

pub mod app_state;
pub mod clock_state;
pub mod snapshot;
pub mod stopwatch_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, TickOutcome, STATE_KEY};
pub use clock_state::{ClockMode, ClockState, ClockView};
pub use snapshot::{ClockSnapshot, Restored};
pub use stopwatch_state::StopwatchState;
pub use timer_state::TimerState;
