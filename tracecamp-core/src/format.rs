//! Formatting helpers shared by the reporter and presentation views.

use chrono::{Local, LocalResult, TimeZone};

/// Format a byte count as megabytes with two decimals.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

/// Render an epoch-seconds timestamp as local wall-clock time.
pub fn format_epoch(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0) {
        LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => "unknown".to_string(),
    }
}

/// Format an optional request duration; absent means the trace filename
/// carried no duration token, which is distinct from a 0.000s request.
pub fn format_duration_opt(duration_secs: Option<f64>) -> String {
    match duration_secs {
        Some(d) => format!("{:.3}s", d),
        None => "N/A".to_string(),
    }
}
