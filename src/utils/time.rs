//! Unix timestamp helpers

use chrono::{DateTime, Utc};

/// Seconds in one day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Current time in seconds since the Unix epoch
#[must_use]
#[inline]
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Whole days elapsed from `earlier` to `later`, never negative
#[must_use]
#[inline]
pub const fn days_between(earlier: i64, later: i64) -> i64 {
    let elapsed = later.saturating_sub(earlier);
    if elapsed <= 0 {
        return 0;
    }
    elapsed / SECONDS_PER_DAY
}

/// Timestamp `days` days before `now`
#[must_use]
#[inline]
pub fn days_ago(now: i64, days: u32) -> i64 {
    now.saturating_sub(i64::from(days).saturating_mul(SECONDS_PER_DAY))
}

/// Format a Unix timestamp as `YYYY-MM-DD` (UTC)
#[must_use]
#[inline]
pub fn format_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map_or_else(|| "unknown".to_owned(), |dt| dt.format("%Y-%m-%d").to_string())
}
