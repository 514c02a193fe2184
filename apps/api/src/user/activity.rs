use chrono::{DateTime, Duration, Utc};

pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

/// Searches made within the last week and the last 30 days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    pub this_week: usize,
    pub this_month: usize,
}

/// Number of timestamps at or after `now - days`.
pub fn count_since(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, days: i64) -> usize {
    let cutoff = now - Duration::days(days);
    timestamps.iter().filter(|t| **t >= cutoff).count()
}

pub fn activity_counts(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> ActivityCounts {
    ActivityCounts {
        this_week: count_since(timestamps, now, WEEK_DAYS),
        this_month: count_since(timestamps, now, MONTH_DAYS),
    }
}
