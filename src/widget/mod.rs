//! Read-only projection of the store for home-screen and lock-screen widgets.

pub mod notifier;
pub mod scheduler;

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::Countdown;
use crate::gradient::DEFAULT_GRADIENT;
use crate::progress::Progress;

pub use notifier::{RefreshReason, WidgetNotifier};
pub use scheduler::{next_refresh_after, RefreshScheduler};

/// Number of hourly entries handed to the widget host per timeline.
pub const TIMELINE_ENTRIES: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewStyle {
    #[default]
    SingleProgressBar,
    DoubleProgressBar,
}

/// What a widget needs to draw one countdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub remaining_days: u32,
    pub completed_days: u32,
    pub total_days: u32,
    pub percent_complete: f64,
    pub gradient_name: String,
    pub title: String,
}

impl WidgetData {
    /// Shown when no countdown is selected for the slot.
    pub fn placeholder(today: NaiveDate) -> Self {
        Self {
            start_date: today,
            end_date: today,
            remaining_days: 0,
            completed_days: 0,
            total_days: 0,
            percent_complete: 0.0,
            gradient_name: DEFAULT_GRADIENT.to_string(),
            title: String::new(),
        }
    }

    pub fn from_countdown(countdown: &Countdown, today: NaiveDate) -> Self {
        let progress = countdown.progress(today);
        Self {
            start_date: countdown.start_date.unwrap_or(today),
            end_date: countdown.end_date.unwrap_or(today),
            remaining_days: progress.days_remaining,
            completed_days: progress.days_completed,
            total_days: progress.total_days,
            percent_complete: progress.percent_complete,
            gradient_name: countdown.gradient_name.clone(),
            title: countdown.title.clone(),
        }
    }

    /// Integer percentage used by the circular lock-screen gauge.
    pub fn whole_percent(&self) -> u32 {
        Progress {
            days_completed: self.completed_days,
            days_remaining: self.remaining_days,
            total_days: self.total_days,
            percent_complete: self.percent_complete,
        }
        .whole_percent_complete()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetEntry {
    pub date: DateTime<Local>,
    pub primary: WidgetData,
    pub secondary: Option<WidgetData>,
    pub view_style: ViewStyle,
}

impl WidgetEntry {
    pub fn at(
        date: DateTime<Local>,
        primary: Option<&Countdown>,
        secondary: Option<&Countdown>,
        view_style: ViewStyle,
    ) -> Self {
        let today = date.date_naive();
        Self {
            date,
            primary: primary
                .map(|countdown| WidgetData::from_countdown(countdown, today))
                .unwrap_or_else(|| WidgetData::placeholder(today)),
            secondary: secondary.map(|countdown| WidgetData::from_countdown(countdown, today)),
            view_style,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetTimeline {
    pub entries: Vec<WidgetEntry>,
    /// The host should ask for a new timeline once this moment has passed.
    pub reload_after: DateTime<Local>,
}

/// Hourly entries starting at `now`. Each entry computes progress for its own
/// date, so an entry past midnight already shows the next day.
pub fn build_timeline(
    primary: Option<&Countdown>,
    secondary: Option<&Countdown>,
    now: DateTime<Local>,
    view_style: ViewStyle,
) -> WidgetTimeline {
    let entries: Vec<WidgetEntry> = (0..TIMELINE_ENTRIES)
        .map(|offset| {
            let date = now + Duration::hours(i64::from(offset));
            WidgetEntry::at(date, primary, secondary, view_style)
        })
        .collect();
    let reload_after = entries.last().map(|entry| entry.date).unwrap_or(now);

    WidgetTimeline {
        entries,
        reload_after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn countdown(title: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Countdown {
        let now = Utc::now();
        Countdown {
            id: title.to_lowercase(),
            title: title.into(),
            start_date: start,
            end_date: end,
            primary_widget: false,
            secondary_widget: false,
            gradient_name: "BlueGreen".into(),
            order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).earliest().unwrap()
    }

    #[test]
    fn placeholder_matches_empty_widget() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let data = WidgetData::placeholder(today);
        assert_eq!(data.total_days, 0);
        assert_eq!(data.percent_complete, 0.0);
        assert_eq!(data.gradient_name, DEFAULT_GRADIENT);
        assert!(data.title.is_empty());
    }

    #[test]
    fn projection_carries_progress_and_style() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        let trip = countdown(
            "Trip",
            NaiveDate::from_ymd_opt(2024, 5, 1),
            NaiveDate::from_ymd_opt(2024, 5, 31),
        );
        let data = WidgetData::from_countdown(&trip, today);
        assert_eq!(data.completed_days, 10);
        assert_eq!(data.remaining_days, 20);
        assert_eq!(data.total_days, 30);
        assert_eq!(data.whole_percent(), 33);
        assert_eq!(data.gradient_name, "BlueGreen");
        assert_eq!(data.title, "Trip");
    }

    #[test]
    fn missing_dates_project_as_today() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        let data = WidgetData::from_countdown(&countdown("Blank", None, None), today);
        assert_eq!(data.start_date, today);
        assert_eq!(data.end_date, today);
        assert_eq!(data.percent_complete, 0.0);
    }

    #[test]
    fn timeline_has_hourly_entries() {
        let primary = countdown(
            "Primary",
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 12, 31),
        );
        let now = local(2024, 6, 1, 9);
        let timeline = build_timeline(Some(&primary), None, now, ViewStyle::DoubleProgressBar);

        assert_eq!(timeline.entries.len(), TIMELINE_ENTRIES as usize);
        assert_eq!(timeline.entries[0].date, now);
        assert_eq!(timeline.reload_after, timeline.entries[4].date);
        for entry in &timeline.entries {
            assert_eq!(entry.primary.title, "Primary");
            assert!(entry.secondary.is_none());
            assert_eq!(entry.view_style, ViewStyle::DoubleProgressBar);
        }
    }

    #[test]
    fn entries_after_midnight_show_the_next_day() {
        let goal = countdown(
            "Goal",
            NaiveDate::from_ymd_opt(2024, 6, 1),
            NaiveDate::from_ymd_opt(2024, 6, 30),
        );
        let now = local(2024, 6, 10, 22);
        let timeline = build_timeline(None, Some(&goal), now, ViewStyle::SingleProgressBar);

        let first = timeline.entries[0].secondary.as_ref().unwrap();
        let last = timeline.entries[4].secondary.as_ref().unwrap();
        assert_eq!(first.completed_days, 9);
        assert_eq!(last.completed_days, 10);
        assert_eq!(timeline.entries[0].primary, WidgetData::placeholder(now.date_naive()));
    }
}
