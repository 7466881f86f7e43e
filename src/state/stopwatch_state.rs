//! Stopwatch sub-clock state and transitions

/// Elapsed-time state anchored to an absolute origin.
///
/// `start_at` is the epoch the stopwatch would have been started at had it
/// never been paused; it is set exactly while running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwatchState {
    pub elapsed_ms: i64,
    pub start_at: Option<i64>,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.start_at.is_some()
    }

    /// Elapsed time at `now`, recomputed from the origin while running
    pub fn elapsed_at(&self, now: i64) -> i64 {
        match self.start_at {
            Some(start_at) => now.saturating_sub(start_at).max(0),
            None => self.elapsed_ms,
        }
    }

    /// Start or resume counting up. Returns false if already running.
    pub fn start(&mut self, now: i64) -> bool {
        if self.is_running() {
            return false;
        }
        self.start_at = Some(now.saturating_sub(self.elapsed_ms));
        true
    }

    /// Freeze the elapsed time. Returns false if idle.
    pub fn pause(&mut self, now: i64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed_ms = self.elapsed_at(now);
        self.start_at = None;
        true
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.start_at = None;
    }

    /// Refresh the display value from the origin
    pub fn refresh(&mut self, now: i64) {
        if self.is_running() {
            self.elapsed_ms = self.elapsed_at(now);
        }
    }
}
