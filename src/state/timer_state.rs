//! Countdown sub-clock state and transitions

use tracing::debug;

/// Default countdown length
pub const DEFAULT_DURATION_MS: i64 = 60 * 1000;
/// Value a duration snaps to when an adjustment would drive it to zero or below
pub const DURATION_FLOOR_MS: i64 = 60 * 1000;
/// Shortest duration accepted from a persisted snapshot
pub const MIN_DURATION_MS: i64 = 1000;

/// Countdown state anchored to an absolute deadline.
///
/// `end_at` is set exactly while the countdown runs, so the running flag is
/// derived from it rather than stored separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub duration_ms: i64,
    pub remaining_ms: i64,
    pub end_at: Option<i64>,
}

impl TimerState {
    /// Create an idle countdown of the given length
    pub fn new(duration_ms: i64) -> Self {
        let duration_ms = normalize_duration(duration_ms);
        Self {
            duration_ms,
            remaining_ms: duration_ms,
            end_at: None,
        }
    }

    /// Check if the countdown is running
    pub fn is_running(&self) -> bool {
        self.end_at.is_some()
    }

    /// Check if the countdown reached zero and has not been reset yet
    pub fn is_expired(&self) -> bool {
        !self.is_running() && self.remaining_ms == 0
    }

    /// Remaining time at `now`, recomputed from the deadline while running
    pub fn remaining_at(&self, now: i64) -> i64 {
        match self.end_at {
            Some(end_at) => end_at.saturating_sub(now).max(0),
            None => self.remaining_ms,
        }
    }

    /// Start or resume the countdown. Returns false if it was already running.
    ///
    /// Starting an expired countdown begins a fresh run of the full duration.
    pub fn start(&mut self, now: i64) -> bool {
        if self.is_running() {
            return false;
        }
        if self.remaining_ms <= 0 {
            self.remaining_ms = self.duration_ms;
        }
        self.end_at = Some(now.saturating_add(self.remaining_ms));
        true
    }

    /// Pause the countdown, keeping what is left. Returns false if idle.
    pub fn pause(&mut self, now: i64) -> bool {
        let Some(end_at) = self.end_at.take() else {
            return false;
        };
        self.remaining_ms = end_at.saturating_sub(now).max(0);
        true
    }

    /// Stop and rewind to the full duration
    pub fn reset(&mut self) {
        self.end_at = None;
        self.remaining_ms = self.duration_ms;
    }

    /// Change the target length by `delta_ms`.
    ///
    /// An idle countdown resyncs its remaining time to the new duration. A
    /// running countdown moves its deadline by the same delta and keeps going.
    pub fn adjust_duration(&mut self, delta_ms: i64, now: i64) {
        let next = self.duration_ms.saturating_add(delta_ms);
        self.duration_ms = if next <= 0 { DURATION_FLOOR_MS } else { next };

        match self.end_at {
            Some(end_at) => {
                let end_at = end_at.saturating_add(delta_ms);
                self.end_at = Some(end_at);
                self.remaining_ms = end_at.saturating_sub(now).max(0);
            }
            None => self.remaining_ms = self.duration_ms,
        }
        debug!("Timer duration adjusted by {}ms to {}ms", delta_ms, self.duration_ms);
    }

    /// Terminal transition at zero. Returns false if the countdown was not
    /// running, which makes repeated calls no-ops.
    pub fn expire(&mut self) -> bool {
        if self.end_at.take().is_none() {
            return false;
        }
        self.remaining_ms = 0;
        true
    }

    /// Refresh the display value from the deadline, expiring at zero.
    /// Returns true if this call expired the countdown.
    pub fn refresh(&mut self, now: i64) -> bool {
        if !self.is_running() {
            return false;
        }
        self.remaining_ms = self.remaining_at(now);
        if self.remaining_ms <= 0 {
            return self.expire();
        }
        false
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MS)
    }
}

/// Bring a persisted duration back into the accepted range
pub fn normalize_duration(duration_ms: i64) -> i64 {
    if duration_ms <= 0 {
        DEFAULT_DURATION_MS
    } else {
        duration_ms.max(MIN_DURATION_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_follows_the_anchor_regardless_of_refreshes() {
        let mut timer = TimerState::new(60_000);
        assert!(timer.start(1_000));

        // No refreshes at all between start and query
        assert_eq!(timer.remaining_at(45_000), 16_000);

        // Many refreshes land on the same value
        let mut refreshed = timer.clone();
        for now in (1_000..45_000).step_by(7) {
            refreshed.refresh(now);
        }
        refreshed.refresh(45_000);
        assert_eq!(refreshed.remaining_ms, 16_000);
        assert_eq!(refreshed.remaining_at(200_000), 0);
    }

    #[test]
    fn pause_and_resume_exclude_paused_time() {
        let mut timer = TimerState::new(60_000);
        timer.start(1_000);
        assert!(timer.pause(45_000));
        assert_eq!(timer.remaining_ms, 16_000);
        assert!(!timer.is_running());

        assert!(timer.start(50_000));
        assert_eq!(timer.end_at, Some(66_000));
        assert_eq!(timer.remaining_at(60_000), 6_000);
    }

    #[test]
    fn start_and_pause_are_no_ops_when_already_in_state() {
        let mut timer = TimerState::new(60_000);
        assert!(!timer.pause(10));
        assert_eq!(timer, TimerState::new(60_000));

        timer.start(0);
        let running = timer.clone();
        assert!(!timer.start(5_000));
        assert_eq!(timer, running);
    }

    #[test]
    fn reset_rewinds_from_any_state() {
        let mut timer = TimerState::new(30_000);
        timer.start(0);
        timer.reset();
        assert_eq!(timer, TimerState::new(30_000));

        timer.start(0);
        timer.refresh(30_000);
        assert!(timer.is_expired());
        timer.reset();
        assert_eq!(timer.remaining_ms, 30_000);
    }

    #[test]
    fn expiry_is_idempotent() {
        let mut timer = TimerState::new(60_000);
        timer.start(0);

        assert!(timer.expire());
        let once = timer.clone();
        assert!(!timer.expire());
        assert_eq!(timer, once);
        assert_eq!(timer.remaining_ms, 0);
        assert_eq!(timer.end_at, None);
    }

    #[test]
    fn expiry_on_idle_timer_changes_nothing() {
        let mut timer = TimerState::new(45_000);
        assert!(!timer.expire());
        assert_eq!(timer.remaining_ms, 45_000);
    }

    #[test]
    fn refresh_expires_at_zero() {
        let mut timer = TimerState::new(60_000);
        timer.start(0);
        assert!(!timer.refresh(59_999));
        assert_eq!(timer.remaining_ms, 1);
        assert!(timer.refresh(60_000));
        assert!(timer.is_expired());
        assert!(!timer.refresh(90_000));
        assert_eq!(timer.remaining_ms, 0);
    }

    #[test]
    fn expired_timer_does_not_repopulate_until_started_or_reset() {
        let mut timer = TimerState::new(60_000);
        timer.start(0);
        timer.refresh(61_000);
        assert_eq!(timer.remaining_at(70_000), 0);

        assert!(timer.start(100_000));
        assert_eq!(timer.end_at, Some(160_000));
    }

    #[test]
    fn idle_adjustment_resyncs_remaining() {
        let mut timer = TimerState::new(60_000);
        timer.adjust_duration(15_000, 0);
        assert_eq!(timer.duration_ms, 75_000);
        assert_eq!(timer.remaining_ms, 75_000);

        timer.adjust_duration(-15_000, 0);
        timer.adjust_duration(-15_000, 0);
        assert_eq!(timer.duration_ms, 45_000);
        assert_eq!(timer.remaining_ms, 45_000);
    }

    #[test]
    fn adjustment_to_zero_or_below_snaps_to_floor() {
        let mut timer = TimerState::new(10_000);
        timer.adjust_duration(-15_000, 0);
        assert_eq!(timer.duration_ms, DURATION_FLOOR_MS);

        let mut timer = TimerState::new(15_000);
        timer.adjust_duration(-15_000, 0);
        assert_eq!(timer.duration_ms, DURATION_FLOOR_MS);

        for _ in 0..200 {
            timer.adjust_duration(-15_000, 0);
            assert!(timer.duration_ms > 0);
            assert!(timer.remaining_ms > 0);
        }
    }

    #[test]
    fn running_adjustment_moves_deadline_without_restarting() {
        let mut timer = TimerState::new(60_000);
        timer.start(1_000);
        let before = timer.end_at.expect("running");

        timer.adjust_duration(15_000, 21_000);
        assert!(timer.is_running());
        assert_eq!(timer.end_at, Some(before + 15_000));
        assert_eq!(timer.remaining_ms, 55_000);
        assert_eq!(timer.duration_ms, 75_000);
    }

    #[test]
    fn normalize_duration_rejects_nonsense() {
        assert_eq!(normalize_duration(-5), DEFAULT_DURATION_MS);
        assert_eq!(normalize_duration(0), DEFAULT_DURATION_MS);
        assert_eq!(normalize_duration(250), MIN_DURATION_MS);
        assert_eq!(normalize_duration(90_000), 90_000);
    }
}
