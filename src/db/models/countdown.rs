//! Countdown data models.
//!
//! Widget flags are not stored on the countdown row. Each widget slot points
//! at no more than one countdown (see `widget_slots`), and the flags below are
//! filled in from that table when a countdown is loaded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::gradient::{Gradient, DEFAULT_GRADIENT};
use crate::progress::Progress;

pub const UNTITLED: &str = "Untitled";

/// The two independent widget surfaces a countdown can be shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetSlot {
    Primary,
    Secondary,
}

impl WidgetSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetSlot::Primary => "primary",
            WidgetSlot::Secondary => "secondary",
        }
    }

    pub fn from_storage_name(value: &str) -> Option<Self> {
        match value {
            "primary" => Some(WidgetSlot::Primary),
            "secondary" => Some(WidgetSlot::Secondary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub id: String,
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub primary_widget: bool,
    pub secondary_widget: bool,
    pub gradient_name: String,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Countdown {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    pub fn gradient(&self) -> &'static Gradient {
        Gradient::lookup(&self.gradient_name)
    }

    pub fn progress(&self, today: NaiveDate) -> Progress {
        Progress::for_dates(self.start_date, self.end_date, today)
    }

    pub fn holds(&self, slot: WidgetSlot) -> bool {
        match slot {
            WidgetSlot::Primary => self.primary_widget,
            WidgetSlot::Secondary => self.secondary_widget,
        }
    }
}

/// Input data for creating a countdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownInput {
    pub title: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub primary_widget: bool,
    #[serde(default)]
    pub secondary_widget: bool,
    pub gradient_name: Option<String>,
}

impl CountdownInput {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn gradient_or_default(&self) -> String {
        self.gradient_name
            .clone()
            .unwrap_or_else(|| DEFAULT_GRADIENT.to_string())
    }
}

/// Partial update. `None` leaves the stored value alone.
///
/// A widget flag of `Some(true)` takes the slot; `Some(false)` releases it
/// only when this countdown currently holds it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownPatch {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub primary_widget: Option<bool>,
    pub secondary_widget: Option<bool>,
    pub gradient_name: Option<String>,
}

impl CountdownPatch {
    pub fn has_row_changes(&self) -> bool {
        self.title.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.gradient_name.is_some()
    }

    pub fn slot_changes(&self) -> Vec<(WidgetSlot, bool)> {
        [
            (WidgetSlot::Primary, self.primary_widget),
            (WidgetSlot::Secondary, self.secondary_widget),
        ]
        .into_iter()
        .filter_map(|(slot, value)| value.map(|selected| (slot, selected)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_row_changes() && self.slot_changes().is_empty()
    }
}

/// Which countdown, if any, each widget slot shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSelection {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

impl WidgetSelection {
    pub fn get(&self, slot: WidgetSlot) -> Option<&str> {
        match slot {
            WidgetSlot::Primary => self.primary.as_deref(),
            WidgetSlot::Secondary => self.secondary.as_deref(),
        }
    }

    pub fn set(&mut self, slot: WidgetSlot, countdown_id: Option<String>) {
        match slot {
            WidgetSlot::Primary => self.primary = countdown_id,
            WidgetSlot::Secondary => self.secondary = countdown_id,
        }
    }
}

/// A countdown together with progress computed for a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownProgress {
    #[serde(flatten)]
    pub countdown: Countdown,
    pub progress: Progress,
}

impl CountdownProgress {
    pub fn at(countdown: Countdown, today: NaiveDate) -> Self {
        let progress = countdown.progress(today);
        Self {
            countdown,
            progress,
        }
    }
}
