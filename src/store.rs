//! The countdown store: persistence plus widget refresh signalling.
//!
//! Every mutation is one transaction on the database worker. On success a
//! refresh signal goes out; on failure the caller gets a [`StoreError`] and
//! nothing changed.

use chrono::{DateTime, Local, NaiveDate};
use log::warn;

use crate::db::{
    Countdown, CountdownInput, CountdownPatch, CountdownProgress, Database, WidgetSelection,
    WidgetSlot,
};
use crate::error::{StoreError, StoreResult};
use crate::widget::{build_timeline, RefreshReason, ViewStyle, WidgetNotifier, WidgetTimeline};

#[derive(Clone)]
pub struct CountdownStore {
    db: Database,
    notifier: WidgetNotifier,
}

impl CountdownStore {
    pub fn new(db: Database, notifier: WidgetNotifier) -> Self {
        Self { db, notifier }
    }

    pub fn notifier(&self) -> &WidgetNotifier {
        &self.notifier
    }

    pub async fn create(&self, input: CountdownInput) -> StoreResult<Countdown> {
        let countdown = self.db.insert_countdown(input).await?;
        self.notifier.notify(RefreshReason::Created);
        Ok(countdown)
    }

    pub async fn get(&self, countdown_id: &str) -> StoreResult<Countdown> {
        self.db
            .get_countdown(countdown_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(countdown_id.to_string()))
    }

    /// All countdowns, ordered for display.
    pub async fn list(&self) -> StoreResult<Vec<Countdown>> {
        Ok(self.db.get_countdowns().await?)
    }

    pub async fn list_with_progress(&self, today: NaiveDate) -> StoreResult<Vec<CountdownProgress>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|countdown| CountdownProgress::at(countdown, today))
            .collect())
    }

    pub async fn update(&self, countdown_id: &str, patch: CountdownPatch) -> StoreResult<Countdown> {
        if patch.is_empty() {
            return Err(StoreError::InvalidInput("no fields to update".into()));
        }
        let countdown = self
            .db
            .update_countdown(countdown_id, patch)
            .await?
            .ok_or_else(|| StoreError::NotFound(countdown_id.to_string()))?;
        self.notifier.notify(RefreshReason::Updated);
        Ok(countdown)
    }

    pub async fn delete(&self, countdown_id: &str) -> StoreResult<()> {
        if !self.db.delete_countdown(countdown_id).await? {
            return Err(StoreError::NotFound(countdown_id.to_string()));
        }
        self.notifier.notify(RefreshReason::Deleted);
        Ok(())
    }

    /// Make `ordered_ids` the display order, renumbering from 0.
    pub async fn reorder(&self, ordered_ids: Vec<String>) -> StoreResult<Vec<Countdown>> {
        let countdowns = self
            .db
            .reorder_countdowns(ordered_ids)
            .await?
            .ok_or_else(|| {
                StoreError::InvalidInput(
                    "reorder must list every countdown exactly once".into(),
                )
            })?;
        self.notifier.notify(RefreshReason::Reordered);
        Ok(countdowns)
    }

    /// Move the items at `from_indices` so they land before `to_offset`,
    /// the way a drag in the list does, then renumber densely.
    pub async fn move_items(&self, from_indices: &[usize], to_offset: usize) -> StoreResult<Vec<Countdown>> {
        let ids: Vec<String> = self.list().await?.into_iter().map(|c| c.id).collect();
        let moved = move_offsets(ids, from_indices, to_offset)?;
        self.reorder(moved).await
    }

    pub async fn set_widget_slot(
        &self,
        countdown_id: &str,
        slot: WidgetSlot,
        selected: bool,
    ) -> StoreResult<Countdown> {
        let countdown = self
            .db
            .set_widget_slot(countdown_id, slot, selected)
            .await?
            .ok_or_else(|| StoreError::NotFound(countdown_id.to_string()))?;
        self.notifier.notify(RefreshReason::SelectionChanged);
        Ok(countdown)
    }

    pub async fn widget_selection(&self) -> StoreResult<WidgetSelection> {
        Ok(self.db.get_widget_selection().await?)
    }

    /// Re-read the store and ask widgets to re-render. Nothing is written.
    pub async fn refresh(&self) -> StoreResult<usize> {
        let count = self.list().await?.len();
        self.notifier.notify(RefreshReason::Manual);
        Ok(count)
    }

    pub async fn widget_timeline(
        &self,
        now: DateTime<Local>,
        view_style: ViewStyle,
    ) -> StoreResult<WidgetTimeline> {
        let primary = self.db.get_slot_countdown(WidgetSlot::Primary).await?;
        let secondary = self.db.get_slot_countdown(WidgetSlot::Secondary).await?;
        if primary.is_none() {
            warn!("No countdown selected for widget");
        }
        Ok(build_timeline(
            primary.as_ref(),
            secondary.as_ref(),
            now,
            view_style,
        ))
    }
}

/// List move semantics: remove the items at `from_indices` (kept in their
/// relative order) and insert them before the element that was at
/// `to_offset`; `to_offset == len` appends.
fn move_offsets(items: Vec<String>, from_indices: &[usize], to_offset: usize) -> StoreResult<Vec<String>> {
    let len = items.len();
    if to_offset > len {
        return Err(StoreError::InvalidInput(format!(
            "destination {to_offset} is past the end of {len} countdowns"
        )));
    }
    let mut sources: Vec<usize> = from_indices.to_vec();
    sources.sort_unstable();
    sources.dedup();
    if let Some(&bad) = sources.iter().find(|&&index| index >= len) {
        return Err(StoreError::InvalidInput(format!(
            "index {bad} is out of range for {len} countdowns"
        )));
    }

    let shift = sources.iter().filter(|&&index| index < to_offset).count();
    let mut moving = Vec::with_capacity(sources.len());
    let mut remaining = Vec::with_capacity(len - sources.len());
    for (index, item) in items.into_iter().enumerate() {
        if sources.binary_search(&index).is_ok() {
            moving.push(item);
        } else {
            remaining.push(item);
        }
    }

    let insert_at = to_offset - shift;
    remaining.splice(insert_at..insert_at, moving);
    Ok(remaining)
}
