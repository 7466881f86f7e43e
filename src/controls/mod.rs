//! Host controls module
//!
//! This module contains the terminal surface of the clock: control parsing,
//! handlers, response structures and the live display.

pub mod commands;
pub mod display;
pub mod handlers;
pub mod responses;

pub use commands::{Command, HELP};
pub use display::display_task;
pub use handlers::{handle_command, status_handler, Reply};
pub use responses::{ControlResponse, StatusResponse};
