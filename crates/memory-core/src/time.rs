// crates/memory-core/src/time.rs
//! Millisecond-since-epoch timestamps, per spec §3 ("All timestamps are
//! unsigned 64-bit milliseconds since the Unix epoch").

/// Current time in epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Render a relative-time label per spec §4.7's fixed thresholds.
pub fn relative_time(ts_ms: u64, now_ms: u64) -> String {
    let delta_ms = now_ms.saturating_sub(ts_ms);
    let minute = 60_000u64;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if delta_ms < minute {
        "just now".to_string()
    } else if delta_ms < hour {
        format!("{}m ago", delta_ms / minute)
    } else if delta_ms < day {
        format!("{}h ago", delta_ms / hour)
    } else if delta_ms < week {
        format!("{}d ago", delta_ms / day)
    } else {
        absolute_date(ts_ms)
    }
}

/// Render an absolute local-ish date (UTC here — no tz database dependency).
fn absolute_date(ts_ms: u64) -> String {
    let secs = (ts_ms / 1000) as i64;
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => "unknown date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn just_now_under_one_minute() {
        let now = 1_000_000u64;
        assert_eq!(relative_time(now - 30_000, now), "just now");
    }

    #[test]
    fn minutes_ago() {
        let now = 10 * 60_000u64;
        assert_eq!(relative_time(0, now), "10m ago");
    }

    #[test]
    fn hours_ago() {
        let now = 3 * 3_600_000u64;
        assert_eq!(relative_time(0, now), "3h ago");
    }

    #[test]
    fn days_ago() {
        let now = 2 * 86_400_000u64;
        assert_eq!(relative_time(0, now), "2d ago");
    }

    #[test]
    fn falls_back_to_absolute_after_a_week() {
        let now = 8 * 86_400_000u64;
        let label = relative_time(0, now);
        assert!(label.contains('-'), "expected an absolute date, got {label}");
    }
}
