//! Background tasks module
//!
//! This module contains the two independent suspension points that drive the
//! clock: the frame-cadence tick scheduler and the deadline notifier.

pub mod deadline_notifier;
pub mod tick_scheduler;

// Re-export main functions
pub use deadline_notifier::deadline_notifier_task;
pub use tick_scheduler::{tick_scheduler_task, TickPhase};
