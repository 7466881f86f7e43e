//! Utility functions module
//!
//! Process-level helpers for the terminal host.

pub mod signals;

pub use signals::shutdown_signal;
