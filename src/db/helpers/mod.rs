use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::db::models::WidgetSlot;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn parse_optional_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        Some(raw) => parse_date(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(format_date)
}

pub fn parse_slot(value: &str) -> Result<WidgetSlot> {
    WidgetSlot::from_storage_name(value).with_context(|| format!("unknown widget slot {value}"))
}
