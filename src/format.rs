//! Display formatting for both sub-clocks

/// Countdown display: whole minutes and seconds, `MM:SS`
pub fn countdown(remaining_ms: i64) -> String {
    let total_seconds = remaining_ms.max(0) / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Stopwatch display with centiseconds, `MM:SS.cc`
pub fn stopwatch(elapsed_ms: i64) -> String {
    let elapsed_ms = elapsed_ms.max(0);
    let total_seconds = elapsed_ms / 1000;
    format!(
        "{:02}:{:02}.{:02}",
        total_seconds / 60,
        total_seconds % 60,
        (elapsed_ms % 1000) / 10
    )
}
