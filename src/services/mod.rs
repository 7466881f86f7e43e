//! External capability module
//!
//! This module contains the capabilities injected into the clock store:
//! the wall clock, the persisted state repository and the notifier.

pub mod clock;
pub mod notification;
pub mod storage;

// Re-export main types
pub use clock::{EpochClock, ManualClock, SystemClock};
pub use notification::{announce, Notifier, NotifyError, Permission, TerminalNotifier};
pub use storage::{FileRepository, MemoryRepository, StateRepository, StorageError};
