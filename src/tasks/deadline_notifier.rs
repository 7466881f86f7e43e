//! Deadline notifier: a single wall-clock scheduled expiry callback

use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that expires the countdown at its deadline even when the
/// tick scheduler is not producing frames.
///
/// At most one sleep is outstanding. It is re-armed whenever the deadline
/// moves and dropped as soon as the countdown stops, so a paused and resumed
/// countdown can never be expired by its old deadline.
pub async fn deadline_notifier_task(state: Arc<AppState>) {
    info!("Starting deadline notifier task");

    let mut state_rx = state.subscribe();

    loop {
        // Mark the channel seen, then arm from the store itself
        state_rx.borrow_and_update();
        let armed = current_deadline(&state);
        let Some(end_at) = armed else {
            // Nothing to watch until the countdown runs
            if state_rx.changed().await.is_err() {
                break;
            }
            continue;
        };

        let wait = state.millis_until(end_at);
        debug!("Deadline armed for {} ({}ms away)", end_at, wait);
        let deadline = sleep(Duration::from_millis(wait));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    // The sleep runs on the monotonic clock; the wall clock decides
                    match state.check_deadline() {
                        Ok(true) => info!("Deadline reached, countdown expired"),
                        Ok(false) => debug!("Deadline fired early or already handled, re-arming"),
                        Err(e) => {
                            error!("Failed to check deadline: {}", e);
                            sleep(Duration::from_secs(1)).await;
                        }
                    }
                    break;
                }
                changed = state_rx.changed() => {
                    if changed.is_err() {
                        debug!("State channel closed, stopping deadline notifier");
                        return;
                    }
                    let current = current_deadline(&state);
                    if current != armed {
                        debug!("Deadline moved from {:?} to {:?}", armed, current);
                        break;
                    }
                }
            }
        }
    }
}

fn current_deadline(state: &AppState) -> Option<i64> {
    match state.get_clock_state() {
        Ok(current) => current.timer.end_at,
        Err(e) => {
            error!("Failed to read clock state: {}", e);
            None
        }
    }
}
