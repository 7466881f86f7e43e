//! Expiry announcements: system notification with an alert fallback

use std::io::{self, Write};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Notification capability as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Unsupported,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifications are not permitted ({0:?})")]
    NotPermitted(Permission),
    #[error("failed to deliver notification: {0}")]
    Delivery(#[from] io::Error),
}

/// Announces countdown expiry to the user
pub trait Notifier: Send + Sync {
    /// Current capability, without prompting
    fn permission(&self) -> Permission;

    /// Ask for permission. Best effort: callers ignore the answer until expiry
    fn request_permission(&self) -> Permission {
        self.permission()
    }

    /// Deliver a system notification
    fn notify(&self, message: &str) -> Result<(), NotifyError>;

    /// Blocking user-facing alert used when notifications are unavailable
    fn alert(&self, message: &str);
}

/// Notifier for an interactive terminal.
///
/// A granted notification rings the bell and prints on stdout. The alert
/// fallback prints a banner on stderr.
#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    permission: Permission,
}

impl TerminalNotifier {
    pub fn new(permission: Permission) -> Self {
        Self { permission }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&self) -> Permission {
        debug!("Notification permission requested: {:?}", self.permission);
        self.permission
    }

    fn notify(&self, message: &str) -> Result<(), NotifyError> {
        if self.permission != Permission::Granted {
            return Err(NotifyError::NotPermitted(self.permission));
        }

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "\x07\n{}", message)?;
        stdout.flush()?;
        info!("Notification delivered: {}", message);
        Ok(())
    }

    fn alert(&self, message: &str) {
        let rule = "=".repeat(message.len() + 4);
        eprintln!("\n{}\n| {} |\n{}", rule, message, rule);
    }
}

/// Deliver `message`, falling back to an alert when notifying is not possible
pub fn announce(notifier: &dyn Notifier, message: &str) {
    match notifier.permission() {
        Permission::Granted => {
            if let Err(e) = notifier.notify(message) {
                debug!("Notification failed, falling back to alert: {}", e);
                notifier.alert(message);
            }
        }
        other => {
            debug!("Notification permission is {:?}, using alert", other);
            notifier.alert(message);
        }
    }
}
