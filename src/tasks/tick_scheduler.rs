//! Tick scheduler: frame-cadence display refresh while a clock runs

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    Ticking,
}

/// Background task refreshing display values while either clock runs.
///
/// Every value is recomputed from the anchors, so a throttled or suspended
/// task only makes the display stale, never wrong.
pub async fn tick_scheduler_task(state: Arc<AppState>, frame_interval: Duration) {
    info!("Starting tick scheduler task ({}ms frames)", frame_interval.as_millis());

    let mut state_rx = state.subscribe();
    let mut phase = TickPhase::Idle;

    loop {
        // Idle until the store reports a running clock. The channel only
        // wakes us; mark it seen before reading so no change is missed.
        state_rx.borrow_and_update();
        let running = match state.get_clock_state() {
            Ok(current) => current.any_running(),
            Err(e) => {
                error!("Failed to read clock state: {}", e);
                false
            }
        };
        if !running {
            if state_rx.changed().await.is_err() {
                debug!("State channel closed, stopping tick scheduler");
                break;
            }
            continue;
        }
        debug!("Tick scheduler {:?} -> {:?}", phase, TickPhase::Ticking);
        phase = TickPhase::Ticking;

        let mut frames = interval(frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            frames.tick().await;
            match state.tick() {
                Ok((outcome, _)) => {
                    if outcome.expired {
                        debug!("Tick observed countdown expiry");
                    }
                    if !outcome.any_running {
                        break;
                    }
                }
                Err(e) => {
                    error!("Tick failed: {}", e);
                    // Wait a bit before retrying
                    sleep(Duration::from_secs(1)).await;
                    break;
                }
            }
        }

        debug!("Tick scheduler {:?} -> {:?}", phase, TickPhase::Idle);
        phase = TickPhase::Idle;
    }
}
