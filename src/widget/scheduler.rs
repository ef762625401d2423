use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::notifier::{RefreshReason, WidgetNotifier};

/// Delay after local midnight so the new day has definitely started.
const MIDNIGHT_BUFFER_SECS: i64 = 120;

/// First refresh strictly after `now`: the next local midnight plus the buffer.
pub fn next_refresh_after<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let tomorrow = now.date_naive().succ_opt().unwrap_or(NaiveDate::MAX);
    let midnight = tomorrow.and_time(NaiveTime::MIN);
    let start_of_day = match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Midnight skipped by a DST transition.
        LocalResult::None => tz.from_utc_datetime(&midnight),
    };
    start_of_day + Duration::seconds(MIDNIGHT_BUFFER_SECS)
}

/// Emits [`RefreshReason::DayRolledOver`] once a day, shortly after midnight.
///
/// Progress is derived on read, so nothing is written to the database; the
/// tick only tells widget surfaces that "today" changed.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, notifier: WidgetNotifier) -> Result<()> {
        if self.handle.is_some() {
            bail!("refresh scheduler already running");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(refresh_loop(notifier, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("refresh scheduler task failed to join")
        } else {
            Ok(())
        }
    }
}

async fn refresh_loop(notifier: WidgetNotifier, cancel_token: CancellationToken) {
    loop {
        let now = Local::now();
        let next = next_refresh_after(&now);
        let wait = (next.clone() - now).to_std().unwrap_or_default();
        info!("Next widget refresh scheduled for {next}");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                info!("Day rolled over; refreshing widgets");
                notifier.notify(RefreshReason::DayRolledOver);
            }
            _ = cancel_token.cancelled() => {
                info!("refresh scheduler shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};

    #[test]
    fn next_refresh_is_just_after_the_coming_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        let next = next_refresh_after(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 0, 2, 0).unwrap());
    }

    #[test]
    fn just_after_midnight_waits_for_the_following_day() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 0, 1, 0).unwrap();
        let next = next_refresh_after(&now);
        assert_eq!(next, Utc.with_ymd_and_hms(2025, 1, 1, 0, 2, 0).unwrap());
    }

    #[test]
    fn uses_the_clock_time_zone() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 2, 28, 23, 59, 0).unwrap();
        let next = next_refresh_after(&now);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!((next.hour(), next.minute()), (0, 2));
    }

    #[tokio::test]
    async fn start_twice_fails_and_stop_joins() {
        let mut scheduler = RefreshScheduler::new();
        scheduler.start(WidgetNotifier::new()).unwrap();
        assert!(scheduler.is_running());
        assert!(scheduler.start(WidgetNotifier::new()).is_err());

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running());
        scheduler.stop().await.unwrap();
    }
}
