//! Data behind the Gantt-style chart above the countdown list.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::db::Countdown;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBar {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub gradient_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartModel {
    pub bars: Vec<ChartBar>,
    pub min_start: NaiveDate,
    pub max_end: NaiveDate,
    pub today: NaiveDate,
    pub month_dividers: Vec<NaiveDate>,
}

impl ChartModel {
    pub fn build(countdowns: &[Countdown], today: NaiveDate) -> Self {
        let bars: Vec<ChartBar> = countdowns
            .iter()
            .map(|countdown| ChartBar {
                title: countdown.display_title().to_string(),
                start: countdown.start_date.unwrap_or(today),
                end: countdown.end_date.unwrap_or(today),
                gradient_name: countdown.gradient().name,
            })
            .collect();

        let min_start = bars.iter().map(|bar| bar.start).min().unwrap_or(today);
        let max_end = bars.iter().map(|bar| bar.end).max().unwrap_or(today);

        Self {
            month_dividers: month_dividers(min_start, max_end),
            bars,
            min_start,
            max_end,
            today,
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// First day of each month from `start`'s month through `end`'s month,
/// closed off by the last day of `end`'s month.
pub fn month_dividers(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let last = last_of_month(end);
    let mut dividers = Vec::new();
    let mut current = first_of_month(start);
    while current <= last {
        dividers.push(current);
        match current.checked_add_months(Months::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    if dividers.last() != Some(&last) {
        dividers.push(last);
    }
    dividers
}
