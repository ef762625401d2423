use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, TransactionBehavior};

use crate::db::{
    connection::Database,
    helpers::parse_slot,
    models::{Countdown, WidgetSelection, WidgetSlot},
};

use super::countdowns::{select_countdown, touch};

/// Point `slot` at `countdown_id`, replacing whichever countdown held it.
pub(super) fn assign_slot(
    conn: &Connection,
    slot: WidgetSlot,
    countdown_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO widget_slots (slot, countdown_id, selected_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(slot) DO UPDATE SET
             countdown_id = excluded.countdown_id,
             selected_at = excluded.selected_at",
        params![slot.as_str(), countdown_id, now.to_rfc3339()],
    )
    .with_context(|| format!("failed to assign {} widget slot", slot.as_str()))?;
    Ok(())
}

/// Empty `slot`, but only if `countdown_id` is the one holding it.
pub(super) fn release_slot(conn: &Connection, slot: WidgetSlot, countdown_id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM widget_slots WHERE slot = ?1 AND countdown_id = ?2",
        params![slot.as_str(), countdown_id],
    )
    .with_context(|| format!("failed to release {} widget slot", slot.as_str()))?;
    Ok(())
}

fn select_selection(conn: &Connection) -> Result<WidgetSelection> {
    let mut stmt = conn.prepare("SELECT slot, countdown_id FROM widget_slots")?;
    let mut rows = stmt.query([])?;
    let mut selection = WidgetSelection::default();
    while let Some(row) = rows.next()? {
        let slot: String = row.get("slot")?;
        selection.set(parse_slot(&slot)?, Some(row.get("countdown_id")?));
    }
    Ok(selection)
}

impl Database {
    /// Select or release a widget slot for a countdown.
    /// Returns `None` when the countdown does not exist.
    pub async fn set_widget_slot(
        &self,
        countdown_id: &str,
        slot: WidgetSlot,
        selected: bool,
    ) -> Result<Option<Countdown>> {
        let countdown_id = countdown_id.to_string();
        self.execute(move |conn| {
            let now = Utc::now();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if select_countdown(&tx, &countdown_id)?.is_none() {
                return Ok(None);
            }

            if selected {
                assign_slot(&tx, slot, &countdown_id, now)?;
            } else {
                release_slot(&tx, slot, &countdown_id)?;
            }
            touch(&tx, &countdown_id, now)?;

            let countdown = select_countdown(&tx, &countdown_id)?;
            tx.commit().context("failed to commit widget slot change")?;
            Ok(countdown)
        })
        .await
    }

    pub async fn get_widget_selection(&self) -> Result<WidgetSelection> {
        self.execute(|conn| select_selection(conn)).await
    }

    /// The countdown shown in `slot`, if any.
    pub async fn get_slot_countdown(&self, slot: WidgetSlot) -> Result<Option<Countdown>> {
        self.execute(move |conn| {
            let countdown_id: Option<String> = {
                let mut stmt =
                    conn.prepare("SELECT countdown_id FROM widget_slots WHERE slot = ?1")?;
                let mut rows = stmt.query(params![slot.as_str()])?;
                match rows.next()? {
                    Some(row) => Some(row.get(0)?),
                    None => None,
                }
            };

            match countdown_id {
                Some(id) => select_countdown(conn, &id),
                None => Ok(None),
            }
        })
        .await
    }
}
