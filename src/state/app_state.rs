//! Clock state store: single source of truth for both sub-clocks

use std::sync::{Arc, Mutex};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{ClockMode, ClockSnapshot, ClockState, ClockView};
use crate::services::{announce, EpochClock, Notifier, StateRepository};

/// Storage key of the persisted snapshot
pub const STATE_KEY: &str = "workout_timer_state";

/// Message announced when a countdown reaches zero
pub const EXPIRY_MESSAGE: &str = "Timer finished";

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// This tick observed the countdown reaching zero
    pub expired: bool,
    /// At least one sub-clock is still running after the tick
    pub any_running: bool,
}

/// Clock store shared by the controls and the two schedulers
pub struct AppState {
    /// Current clock state
    pub clock_state: Arc<Mutex<ClockState>>,
    /// Injected capabilities
    clock: Arc<dyn EpochClock>,
    repository: Arc<dyn StateRepository>,
    notifier: Arc<dyn Notifier>,
    storage_key: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for state change notifications
    pub state_change_tx: watch::Sender<ClockState>,
    /// Keep the receiver alive to prevent channel closure
    pub _state_change_rx: watch::Receiver<ClockState>,
}

impl AppState {
    /// Create a store holding the default state (idle one-minute countdown)
    pub fn new(
        clock: Arc<dyn EpochClock>,
        repository: Arc<dyn StateRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state_change_tx, state_change_rx) = watch::channel(ClockState::new());

        Self {
            clock_state: Arc::new(Mutex::new(ClockState::new())),
            clock,
            repository,
            notifier,
            storage_key: STATE_KEY.to_string(),
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            state_change_tx,
            _state_change_rx: state_change_rx,
        }
    }

    /// Current wall-clock time in epoch milliseconds
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ClockState> {
        self.state_change_tx.subscribe()
    }

    /// Apply a mutation, then persist and publish the new state
    fn update_state<R, F>(&self, action: &str, updater: F) -> Result<(R, ClockView), String>
    where
        F: FnOnce(&mut ClockState, i64) -> R,
    {
        let mut state = self.clock_state.lock()
            .map_err(|e| format!("Failed to lock clock state: {}", e))?;

        let now = self.clock.now_ms();
        let result = updater(&mut *state, now);
        let new_state = state.clone();
        // Publish before unlocking so the channel never lags the store
        self.state_change_tx.send_replace(new_state.clone());
        drop(state);

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.save_snapshot(&new_state, now);

        Ok((result, new_state.view(now)))
    }

    /// Write the snapshot. Storage is best effort: failures are logged only.
    fn save_snapshot(&self, state: &ClockState, now: i64) {
        let snapshot = ClockSnapshot::capture(state, now);
        let blob = match snapshot.to_json() {
            Ok(blob) => blob,
            Err(e) => {
                warn!("Failed to serialize clock snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.repository.save(&self.storage_key, &blob) {
            warn!("Failed to persist clock snapshot: {}", e);
        }
    }

    /// Persist the current state outside of a mutation (e.g. on shutdown)
    pub fn persist(&self) -> Result<(), String> {
        let state = self.get_clock_state()?;
        self.save_snapshot(&state, self.clock.now_ms());
        Ok(())
    }

    /// Restore from the repository. Missing or unreadable storage leaves the defaults.
    pub fn load(&self) -> Result<ClockView, String> {
        let blob = match self.repository.load(&self.storage_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No persisted clock state, starting from defaults");
                return self.get_view();
            }
            Err(e) => {
                warn!("Failed to load persisted clock state: {}", e);
                return self.get_view();
            }
        };

        match ClockSnapshot::parse(&blob) {
            Ok(snapshot) => self.hydrate(&snapshot),
            Err(e) => {
                warn!("Ignoring unreadable clock snapshot: {}", e);
                self.get_view()
            }
        }
    }

    /// Replace the whole state with a restored snapshot
    pub fn hydrate(&self, snapshot: &ClockSnapshot) -> Result<ClockView, String> {
        let (expired, view) = self.update_state("hydrate", |state, now| {
            let restored = snapshot.restore(now);
            *state = restored.state;
            restored.expired_while_away
        })?;

        info!("Clock state restored: {}", view.status_line());
        if expired {
            info!("Countdown finished while away");
            self.announce_expiry();
        }
        Ok(view)
    }

    /// Select which sub-clock is displayed; neither clock is stopped
    pub fn set_mode(&self, mode: ClockMode) -> Result<ClockView, String> {
        info!("Showing {}", mode.as_str());
        self.update_state("mode", |state, _| state.mode = mode)
            .map(|(_, view)| view)
    }

    /// Start or resume the countdown
    pub fn start_timer(&self) -> Result<ClockView, String> {
        // Best effort: the answer only matters at expiry
        let permission = self.notifier.request_permission();
        debug!("Notification permission on start: {:?}", permission);

        let (started, view) = self.update_state("timer-start", |state, now| state.timer.start(now))?;
        if started {
            info!("Timer started with {}ms remaining", view.remaining_ms);
        } else {
            debug!("Timer already running");
        }
        Ok(view)
    }

    /// Pause the countdown
    pub fn pause_timer(&self) -> Result<ClockView, String> {
        let (paused, view) = self.update_state("timer-pause", |state, now| state.timer.pause(now))?;
        if paused {
            info!("Timer paused with {}ms remaining", view.remaining_ms);
        }
        Ok(view)
    }

    /// Stop the countdown and rewind it to the full duration
    pub fn reset_timer(&self) -> Result<ClockView, String> {
        info!("Timer reset");
        self.update_state("timer-reset", |state, _| state.timer.reset())
            .map(|(_, view)| view)
    }

    /// Change the countdown length by whole seconds. Allowed while running:
    /// the deadline then moves by the same amount.
    pub fn adjust_duration(&self, delta_seconds: i64) -> Result<ClockView, String> {
        let delta_ms = delta_seconds.saturating_mul(1000);
        let (_, view) = self.update_state("timer-adjust", |state, now| {
            state.timer.adjust_duration(delta_ms, now)
        })?;
        info!("Timer duration is now {}ms", view.duration_ms);
        Ok(view)
    }

    /// Start or resume the stopwatch
    pub fn start_stopwatch(&self) -> Result<ClockView, String> {
        let (started, view) = self.update_state("stopwatch-start", |state, now| state.stopwatch.start(now))?;
        if started {
            info!("Stopwatch started at {}ms", view.elapsed_ms);
        }
        Ok(view)
    }

    /// Pause the stopwatch
    pub fn pause_stopwatch(&self) -> Result<ClockView, String> {
        let (paused, view) = self.update_state("stopwatch-pause", |state, now| state.stopwatch.pause(now))?;
        if paused {
            info!("Stopwatch paused at {}ms", view.elapsed_ms);
        }
        Ok(view)
    }

    /// Stop the stopwatch and clear it
    pub fn reset_stopwatch(&self) -> Result<ClockView, String> {
        info!("Stopwatch reset");
        self.update_state("stopwatch-reset", |state, _| state.stopwatch.reset())
            .map(|(_, view)| view)
    }

    /// Recompute display values from the anchors. Only the expiry transition
    /// is persisted; display values are derivable from the stored anchors.
    pub fn tick(&self) -> Result<(TickOutcome, ClockView), String> {
        let mut state = self.clock_state.lock()
            .map_err(|e| format!("Failed to lock clock state: {}", e))?;
        let now = self.clock.now_ms();
        if !state.any_running() {
            return Ok((TickOutcome::default(), state.view(now)));
        }

        let expired = state.timer.refresh(now);
        state.stopwatch.refresh(now);
        let new_state = state.clone();
        self.state_change_tx.send_replace(new_state.clone());
        drop(state);

        if expired {
            info!("Countdown reached zero");
            self.save_snapshot(&new_state, now);
            self.announce_expiry();
        }

        let outcome = TickOutcome {
            expired,
            any_running: new_state.any_running(),
        };
        Ok((outcome, new_state.view(now)))
    }

    /// Expire the countdown if its deadline has passed on the wall clock.
    /// Returns true if this call performed the expiry.
    pub fn check_deadline(&self) -> Result<bool, String> {
        self.apply_expiry("timer-deadline", |state, now| {
            let due = state.timer.end_at.is_some_and(|end_at| end_at <= now);
            due && state.timer.expire()
        })
    }

    /// Idempotent expiry action shared by both schedulers: the first caller
    /// wins, later calls find the countdown stopped and do nothing.
    pub fn expire_timer(&self) -> Result<bool, String> {
        self.apply_expiry("timer-expire", |state, _| state.timer.expire())
    }

    /// Run an expiry decision under the lock; persist, publish and announce
    /// only when it actually stopped the countdown
    fn apply_expiry<F>(&self, action: &str, decide: F) -> Result<bool, String>
    where
        F: FnOnce(&mut ClockState, i64) -> bool,
    {
        let mut state = self.clock_state.lock()
            .map_err(|e| format!("Failed to lock clock state: {}", e))?;
        let now = self.clock.now_ms();
        if !decide(&mut *state, now) {
            debug!("Countdown not due or already stopped, {} ignored", action);
            return Ok(false);
        }
        let new_state = state.clone();
        self.state_change_tx.send_replace(new_state.clone());
        drop(state);

        info!("Countdown expired ({})", action);
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        self.save_snapshot(&new_state, now);
        self.announce_expiry();
        Ok(true)
    }

    fn announce_expiry(&self) {
        announce(self.notifier.as_ref(), EXPIRY_MESSAGE);
    }

    /// Milliseconds from now until `end_at`, never negative
    pub fn millis_until(&self, end_at: i64) -> u64 {
        u64::try_from(end_at.saturating_sub(self.clock.now_ms())).unwrap_or(0)
    }

    /// Get current clock state
    pub fn get_clock_state(&self) -> Result<ClockState, String> {
        self.clock_state.lock()
            .map(|state| state.clone())
            .map_err(|e| format!("Failed to lock clock state: {}", e))
    }

    /// Get display values at the current instant
    pub fn get_view(&self) -> Result<ClockView, String> {
        let state = self.get_clock_state()?;
        Ok(state.view(self.clock.now_ms()))
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        notification::testing::RecordingNotifier, ManualClock, MemoryRepository, Permission,
        StorageError,
    };

    struct Fixture {
        clock: Arc<ManualClock>,
        repository: Arc<MemoryRepository>,
        notifier: Arc<RecordingNotifier>,
        state: AppState,
    }

    fn fixture_with(permission: Permission, start_ms: i64) -> Fixture {
        let clock = Arc::new(ManualClock::new(start_ms));
        let repository = Arc::new(MemoryRepository::new());
        let notifier = Arc::new(RecordingNotifier::new(permission));
        let state = AppState::new(clock.clone(), repository.clone(), notifier.clone());
        Fixture { clock, repository, notifier, state }
    }

    fn fixture() -> Fixture {
        fixture_with(Permission::Granted, 1_000)
    }

    fn stored(fixture: &Fixture) -> ClockSnapshot {
        let blob = fixture.repository.load(STATE_KEY).expect("load").expect("snapshot saved");
        ClockSnapshot::parse(&blob).expect("parse")
    }

    #[test]
    fn countdown_scenario() {
        let f = fixture();
        f.state.start_timer().expect("start");

        f.clock.set(45_000);
        assert_eq!(f.state.get_view().expect("view").remaining_ms, 16_000);

        let paused = f.state.pause_timer().expect("pause");
        assert_eq!(paused.remaining_ms, 16_000);
        assert_eq!(stored(&f).remaining_ms, 16_000);

        f.clock.set(50_000);
        f.state.start_timer().expect("resume");
        assert_eq!(f.state.get_clock_state().expect("state").timer.end_at, Some(66_000));

        f.clock.set(60_000);
        assert_eq!(f.state.get_view().expect("view").remaining_ms, 6_000);
    }

    #[test]
    fn start_requests_notification_permission() {
        let f = fixture();
        f.state.start_timer().expect("start");
        assert_eq!(*f.notifier.permission_requests.lock().expect("lock"), 1);
    }

    #[test]
    fn stopwatch_scenario() {
        let f = fixture_with(Permission::Granted, 0);
        f.state.start_stopwatch().expect("start");
        f.clock.set(12_345);
        let paused = f.state.pause_stopwatch().expect("pause");
        assert_eq!(paused.elapsed_ms, 12_345);
        assert_eq!(stored(&f).elapsed, 12_345);

        let reset = f.state.reset_stopwatch().expect("reset");
        assert_eq!(reset.elapsed_ms, 0);
        assert!(!reset.stopwatch_running);
    }

    #[test]
    fn every_mutation_overwrites_the_snapshot() {
        let f = fixture();
        f.state.set_mode(ClockMode::Stopwatch).expect("mode");
        assert_eq!(stored(&f).mode, ClockMode::Stopwatch);

        f.state.start_stopwatch().expect("start");
        let snapshot = stored(&f);
        assert!(snapshot.running_stopwatch);
        assert_eq!(snapshot.start_at, Some(1_000));

        f.state.adjust_duration(15).expect("adjust");
        assert_eq!(stored(&f).duration_ms, 75_000);
    }

    #[test]
    fn published_state_follows_the_store() {
        let f = fixture();
        let rx = f.state.subscribe();
        let published = || rx.borrow().clone();

        f.state.start_timer().expect("start");
        assert_eq!(published(), f.state.get_clock_state().expect("state"));

        f.clock.set(20_000);
        f.state.tick().expect("tick");
        assert_eq!(published().timer.remaining_ms, 41_000);

        f.state.pause_timer().expect("pause");
        assert_eq!(published(), f.state.get_clock_state().expect("state"));
        assert!(!published().timer.is_running());

        f.state.start_timer().expect("resume");
        f.clock.set(200_000);
        assert!(f.state.check_deadline().expect("deadline"));
        assert!(published().timer.is_expired());
    }

    #[test]
    fn mode_switch_keeps_clocks_running() {
        let f = fixture();
        f.state.start_timer().expect("start timer");
        f.state.start_stopwatch().expect("start stopwatch");
        let view = f.state.set_mode(ClockMode::Stopwatch).expect("mode");
        assert!(view.timer_running && view.stopwatch_running);
    }

    #[test]
    fn double_expiry_matches_single_expiry() {
        let f = fixture();
        f.state.start_timer().expect("start");
        f.clock.advance(10_000);

        assert!(f.state.expire_timer().expect("expire"));
        let once = f.state.get_clock_state().expect("state");
        assert!(!f.state.expire_timer().expect("expire again"));

        assert_eq!(f.state.get_clock_state().expect("state"), once);
        assert_eq!(once.timer.remaining_ms, 0);
        assert_eq!(f.notifier.notification_count(), 1);
    }

    #[test]
    fn tick_detects_zero_crossing_once() {
        let f = fixture();
        f.state.start_timer().expect("start");

        f.clock.advance(30_000);
        let (outcome, view) = f.state.tick().expect("tick");
        assert!(!outcome.expired && outcome.any_running);
        assert_eq!(view.remaining_ms, 30_000);

        f.clock.advance(30_000);
        let (outcome, view) = f.state.tick().expect("tick");
        assert!(outcome.expired);
        assert!(!outcome.any_running);
        assert!(view.timer_expired);

        let (outcome, _) = f.state.tick().expect("tick");
        assert!(!outcome.expired);
        assert_eq!(f.notifier.notification_count(), 1);
        assert!(!stored(&f).running_timer);
    }

    #[test]
    fn check_deadline_waits_for_wall_clock() {
        let f = fixture();
        f.state.start_timer().expect("start");

        f.clock.advance(59_999);
        assert!(!f.state.check_deadline().expect("check"));
        f.clock.advance(1);
        assert!(f.state.check_deadline().expect("check"));
        assert!(!f.state.check_deadline().expect("check"));
    }

    #[test]
    fn denied_permission_alerts_instead() {
        let f = fixture_with(Permission::Denied, 0);
        f.state.start_timer().expect("start");
        f.clock.advance(60_000);
        f.state.tick().expect("tick");
        assert_eq!(f.notifier.notification_count(), 0);
        assert_eq!(f.notifier.alert_count(), 1);
    }

    #[test]
    fn running_adjustment_shifts_deadline() {
        let f = fixture();
        f.state.start_timer().expect("start");
        let before = f.state.get_clock_state().expect("state").timer.end_at.expect("running");

        f.clock.advance(20_000);
        let view = f.state.adjust_duration(15).expect("adjust");
        let after = f.state.get_clock_state().expect("state").timer.end_at.expect("running");

        assert_eq!(after - before, 15_000);
        assert!(view.timer_running);
        assert_eq!(view.remaining_ms, 55_000);
    }

    #[test]
    fn hydrating_expired_countdown_announces_it() {
        let f = fixture_with(Permission::Granted, 100_000);
        let snapshot = ClockSnapshot {
            running_timer: true,
            end_at: Some(90_000),
            ..ClockSnapshot::default()
        };

        let view = f.state.hydrate(&snapshot).expect("hydrate");
        assert!(!view.timer_running);
        assert_eq!(view.remaining_ms, 0);
        assert_eq!(f.notifier.notification_count(), 1);
        assert!(!stored(&f).running_timer);
    }

    #[test]
    fn load_restores_previous_session() {
        let f = fixture();
        f.state.start_timer().expect("start");
        f.state.start_stopwatch().expect("start");

        // A new store over the same storage, some time later
        f.clock.advance(20_000);
        let next = AppState::new(f.clock.clone(), f.repository.clone(), f.notifier.clone());
        let view = next.load().expect("load");
        assert!(view.timer_running);
        assert_eq!(view.remaining_ms, 40_000);
        assert_eq!(view.elapsed_ms, 20_000);
    }

    #[test]
    fn load_ignores_garbage() {
        let f = fixture();
        f.repository.save(STATE_KEY, "{{{{").expect("save");
        let view = f.state.load().expect("load");
        assert_eq!(view, ClockState::new().view(1_000));
    }

    struct BrokenRepository;

    impl StateRepository for BrokenRepository {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".to_string()))
        }

        fn save(&self, _key: &str, _blob: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn storage_failures_are_swallowed() {
        let clock = Arc::new(ManualClock::new(0));
        let notifier = Arc::new(RecordingNotifier::new(Permission::Granted));
        let state = AppState::new(clock.clone(), Arc::new(BrokenRepository), notifier);

        state.load().expect("load");
        state.start_timer().expect("start");
        clock.advance(5_000);
        let view = state.pause_timer().expect("pause");
        assert_eq!(view.remaining_ms, 55_000);
        state.persist().expect("persist");
    }

    #[test]
    fn last_action_is_tracked() {
        let f = fixture();
        f.state.reset_stopwatch().expect("reset");
        let (action, when) = f.state.get_last_action();
        assert_eq!(action.as_deref(), Some("stopwatch-reset"));
        assert!(when.is_some());
    }
}
