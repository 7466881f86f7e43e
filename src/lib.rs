//! Workout Clock - a countdown timer and stopwatch that keep correct time
//! across suspension and restarts
//!
//! Both clocks store absolute wall-clock anchors instead of accumulating
//! ticks, persist a snapshot after every change, and announce countdown
//! expiry from a dedicated deadline task.

pub mod adjuster;
pub mod config;
pub mod controls;
pub mod format;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, ClockMode, ClockSnapshot, ClockState, ClockView};
pub use utils::signals::shutdown_signal;
