use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{format_optional_date, parse_datetime, parse_optional_date},
    models::{Countdown, CountdownInput, CountdownPatch, WidgetSlot},
};

use super::widget_slots::{assign_slot, release_slot};

const SELECT_COUNTDOWN: &str = "SELECT c.id, c.title, c.start_date, c.end_date, c.gradient_name,
        c.order_index, c.created_at, c.updated_at,
        EXISTS(SELECT 1 FROM widget_slots w WHERE w.countdown_id = c.id AND w.slot = 'primary')
            AS primary_widget,
        EXISTS(SELECT 1 FROM widget_slots w WHERE w.countdown_id = c.id AND w.slot = 'secondary')
            AS secondary_widget
     FROM countdowns c";

fn row_to_countdown(row: &Row) -> Result<Countdown> {
    let start_date: Option<String> = row.get("start_date")?;
    let end_date: Option<String> = row.get("end_date")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Countdown {
        id: row.get("id")?,
        title: row.get("title")?,
        start_date: parse_optional_date(start_date, "start_date")?,
        end_date: parse_optional_date(end_date, "end_date")?,
        primary_widget: row.get("primary_widget")?,
        secondary_widget: row.get("secondary_widget")?,
        gradient_name: row.get("gradient_name")?,
        order: row.get("order_index")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

pub(super) fn select_countdown(conn: &Connection, countdown_id: &str) -> Result<Option<Countdown>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COUNTDOWN} WHERE c.id = ?1"))?;
    let mut rows = stmt.query(params![countdown_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_countdown(row)?)),
        None => Ok(None),
    }
}

pub(super) fn select_all_countdowns(conn: &Connection) -> Result<Vec<Countdown>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COUNTDOWN} ORDER BY c.order_index ASC, c.created_at ASC"
    ))?;
    let mut rows = stmt.query([])?;
    let mut countdowns = Vec::new();
    while let Some(row) = rows.next()? {
        countdowns.push(row_to_countdown(row)?);
    }
    Ok(countdowns)
}

fn countdown_exists(conn: &Connection, countdown_id: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM countdowns WHERE id = ?1",
            params![countdown_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(super) fn touch(conn: &Connection, countdown_id: &str, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "UPDATE countdowns SET updated_at = ?1 WHERE id = ?2",
        params![now.to_rfc3339(), countdown_id],
    )?;
    Ok(())
}

impl Database {
    /// Insert a countdown at the end of the list and apply any requested
    /// widget slots, all in one transaction.
    pub async fn insert_countdown(&self, input: CountdownInput) -> Result<Countdown> {
        self.execute(move |conn| {
            let now = Utc::now();
            let countdown_id = Uuid::new_v4().to_string();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let max_order: Option<i64> =
                tx.query_row("SELECT MAX(order_index) FROM countdowns", [], |row| {
                    row.get(0)
                })?;
            let order = max_order.map_or(1, |max| max + 1);

            tx.execute(
                "INSERT INTO countdowns (id, title, start_date, end_date, gradient_name, order_index, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    countdown_id,
                    input.title,
                    format_optional_date(input.start_date),
                    format_optional_date(input.end_date),
                    input.gradient_or_default(),
                    order,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert countdown")?;

            if input.primary_widget {
                assign_slot(&tx, WidgetSlot::Primary, &countdown_id, now)?;
            }
            if input.secondary_widget {
                assign_slot(&tx, WidgetSlot::Secondary, &countdown_id, now)?;
            }

            let countdown = select_countdown(&tx, &countdown_id)?
                .ok_or_else(|| anyhow!("Countdown not found after insert"))?;
            tx.commit().context("failed to commit countdown insert")?;
            Ok(countdown)
        })
        .await
    }

    pub async fn get_countdown(&self, countdown_id: &str) -> Result<Option<Countdown>> {
        let countdown_id = countdown_id.to_string();
        self.execute(move |conn| select_countdown(conn, &countdown_id))
            .await
    }

    /// All countdowns in display order.
    pub async fn get_countdowns(&self) -> Result<Vec<Countdown>> {
        self.execute(|conn| select_all_countdowns(conn)).await
    }

    /// Apply a partial update. Returns `None` when the countdown does not exist.
    pub async fn update_countdown(
        &self,
        countdown_id: &str,
        patch: CountdownPatch,
    ) -> Result<Option<Countdown>> {
        let countdown_id = countdown_id.to_string();
        self.execute(move |conn| {
            let now = Utc::now();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if !countdown_exists(&tx, &countdown_id)? {
                return Ok(None);
            }

            // Build update query dynamically based on what's being updated
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(title) = patch.title.clone() {
                updates.push("title = ?");
                params_vec.push(Box::new(title));
            }
            if let Some(start_date) = patch.start_date {
                updates.push("start_date = ?");
                params_vec.push(Box::new(format_optional_date(Some(start_date))));
            }
            if let Some(end_date) = patch.end_date {
                updates.push("end_date = ?");
                params_vec.push(Box::new(format_optional_date(Some(end_date))));
            }
            if let Some(gradient_name) = patch.gradient_name.clone() {
                updates.push("gradient_name = ?");
                params_vec.push(Box::new(gradient_name));
            }

            if !updates.is_empty() {
                updates.push("updated_at = ?");
                params_vec.push(Box::new(now.to_rfc3339()));

                let query = format!("UPDATE countdowns SET {} WHERE id = ?", updates.join(", "));
                params_vec.push(Box::new(countdown_id.clone()));

                // Convert to slice of trait objects for rusqlite
                let params_refs: Vec<&dyn rusqlite::ToSql> =
                    params_vec.iter().map(|b| b.as_ref()).collect();
                tx.execute(&query, params_refs.as_slice())
                    .with_context(|| "failed to update countdown")?;
            }

            for (slot, selected) in patch.slot_changes() {
                if selected {
                    assign_slot(&tx, slot, &countdown_id, now)?;
                } else {
                    release_slot(&tx, slot, &countdown_id)?;
                }
                touch(&tx, &countdown_id, now)?;
            }

            let countdown = select_countdown(&tx, &countdown_id)?
                .ok_or_else(|| anyhow!("Countdown not found after update"))?;
            tx.commit().context("failed to commit countdown update")?;
            Ok(Some(countdown))
        })
        .await
    }

    /// Permanently delete a countdown. Returns `false` when nothing was deleted.
    pub async fn delete_countdown(&self, countdown_id: &str) -> Result<bool> {
        let countdown_id = countdown_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            // Same effect as ON DELETE CASCADE when foreign keys are enforced.
            tx.execute(
                "DELETE FROM widget_slots WHERE countdown_id = ?1",
                params![countdown_id],
            )?;
            let rows_affected = tx
                .execute("DELETE FROM countdowns WHERE id = ?1", params![countdown_id])
                .with_context(|| "failed to delete countdown")?;
            tx.commit().context("failed to commit countdown delete")?;
            Ok(rows_affected > 0)
        })
        .await
    }

    /// Reassign `order_index` densely (0..n-1) following `ordered_ids`.
    ///
    /// Returns `None` and leaves every row untouched when `ordered_ids` is not
    /// a permutation of the stored ids.
    pub async fn reorder_countdowns(&self, ordered_ids: Vec<String>) -> Result<Option<Vec<Countdown>>> {
        self.execute(move |conn| {
            let now = Utc::now();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let stored: HashSet<String> = {
                let mut stmt = tx.prepare("SELECT id FROM countdowns")?;
                let ids = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<HashSet<_>>>()?;
                ids
            };
            let requested: HashSet<&String> = ordered_ids.iter().collect();
            if requested.len() != ordered_ids.len()
                || stored.len() != ordered_ids.len()
                || !ordered_ids.iter().all(|id| stored.contains(id))
            {
                return Ok(None);
            }

            {
                let mut stmt = tx.prepare(
                    "UPDATE countdowns SET order_index = ?1, updated_at = ?2 WHERE id = ?3",
                )?;
                for (index, countdown_id) in ordered_ids.iter().enumerate() {
                    stmt.execute(params![index as i64, now.to_rfc3339(), countdown_id])?;
                }
            }

            let countdowns = select_all_countdowns(&tx)?;
            tx.commit().context("failed to commit reorder")?;
            Ok(Some(countdowns))
        })
        .await
    }
}
