//! Day-granularity progress for a countdown.
//!
//! Everything here works on calendar dates. The caller decides what "today"
//! is, normally via [`today_local`], so results depend on the local time zone
//! but never on the time of day. Crossing time zones can shift the reported
//! progress by one day around midnight; that is expected.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The current calendar date in the local time zone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed number of whole days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn days_remaining(today: NaiveDate, end: NaiveDate) -> u32 {
    clamp_days(days_between(today, end))
}

pub fn days_completed(start: NaiveDate, today: NaiveDate) -> u32 {
    clamp_days(days_between(start, today))
}

fn clamp_days(days: i64) -> u32 {
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

pub fn percent_complete(days_completed: u32, days_remaining: u32) -> f64 {
    let total = u64::from(days_completed) + u64::from(days_remaining);
    if total == 0 {
        return 0.0;
    }
    (f64::from(days_completed) / total as f64 * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub days_completed: u32,
    pub days_remaining: u32,
    pub total_days: u32,
    pub percent_complete: f64,
}

impl Progress {
    pub fn compute(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Self {
        let days_completed = days_completed(start, today);
        let days_remaining = days_remaining(today, end);
        Self {
            days_completed,
            days_remaining,
            total_days: days_completed.saturating_add(days_remaining),
            percent_complete: percent_complete(days_completed, days_remaining),
        }
    }

    /// Missing dates count as `today`, so they contribute zero days.
    pub fn for_dates(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self::compute(start.unwrap_or(today), end.unwrap_or(today), today)
    }

    pub fn percent_left(&self) -> f64 {
        100.0 - self.percent_complete
    }

    /// Percentage as shown on progress bars (truncated toward zero).
    pub fn whole_percent_complete(&self) -> u32 {
        self.percent_complete.floor() as u32
    }

    pub fn whole_percent_left(&self) -> u32 {
        100 - self.whole_percent_complete()
    }
}
