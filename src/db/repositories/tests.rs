//! Repository tests against an in-memory database, plus a few that share
//! one database file between two handles the way the app and widget do.

use std::collections::HashSet;

use chrono::NaiveDate;
use tokio::task::JoinSet;

use crate::db::{
    models::{CountdownInput, CountdownPatch, WidgetSlot},
    Database,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup_test_db() -> Database {
    Database::open_in_memory().expect("Failed to init test DB")
}

fn input(title: &str) -> CountdownInput {
    CountdownInput::new(title, day(2024, 1, 1), day(2024, 12, 31))
}

#[tokio::test]
async fn test_insert_assigns_increasing_order() {
    let db = setup_test_db();

    let first = db.insert_countdown(input("First")).await.unwrap();
    let second = db.insert_countdown(input("Second")).await.unwrap();

    assert_eq!(first.order, 1);
    assert_eq!(second.order, 2);
    assert_eq!(first.gradient_name, "PinkPurple");
    assert!(!first.primary_widget);
    assert!(!first.secondary_widget);
}

#[tokio::test]
async fn test_insert_keeps_missing_dates() {
    let db = setup_test_db();

    let created = db
        .insert_countdown(CountdownInput {
            title: String::new(),
            ..CountdownInput::default()
        })
        .await
        .unwrap();

    let found = db.get_countdown(&created.id).await.unwrap().unwrap();
    assert_eq!(found.start_date, None);
    assert_eq!(found.end_date, None);
    assert_eq!(found.display_title(), "Untitled");
}

#[tokio::test]
async fn test_update_only_touches_given_fields() {
    let db = setup_test_db();
    let created = db.insert_countdown(input("Original")).await.unwrap();

    let updated = db
        .update_countdown(
            &created.id,
            CountdownPatch {
                end_date: Some(day(2025, 6, 30)),
                gradient_name: Some("GrayBlack".into()),
                ..CountdownPatch::default()
            },
        )
        .await
        .unwrap()
        .expect("countdown exists");

    assert_eq!(updated.title, "Original");
    assert_eq!(updated.start_date, Some(day(2024, 1, 1)));
    assert_eq!(updated.end_date, Some(day(2025, 6, 30)));
    assert_eq!(updated.gradient_name, "GrayBlack");
    assert_eq!(updated.order, created.order);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn test_update_missing_countdown_returns_none() {
    let db = setup_test_db();
    let result = db
        .update_countdown(
            "missing",
            CountdownPatch {
                title: Some("x".into()),
                ..CountdownPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_delete_removes_row_and_slot() {
    let db = setup_test_db();
    let created = db
        .insert_countdown(CountdownInput {
            primary_widget: true,
            ..input("Doomed")
        })
        .await
        .unwrap();

    assert!(db.delete_countdown(&created.id).await.unwrap());
    assert!(db.get_countdown(&created.id).await.unwrap().is_none());
    assert_eq!(db.get_widget_selection().await.unwrap().primary, None);
    assert!(!db.delete_countdown(&created.id).await.unwrap());
}

#[tokio::test]
async fn test_slot_moves_between_countdowns() {
    let db = setup_test_db();
    let a = db
        .insert_countdown(CountdownInput {
            primary_widget: true,
            ..input("A")
        })
        .await
        .unwrap();
    let b = db
        .insert_countdown(CountdownInput {
            primary_widget: true,
            secondary_widget: true,
            ..input("B")
        })
        .await
        .unwrap();

    let a = db.get_countdown(&a.id).await.unwrap().unwrap();
    assert!(!a.primary_widget);
    assert!(b.primary_widget && b.secondary_widget);

    let a = db
        .set_widget_slot(&a.id, WidgetSlot::Secondary, true)
        .await
        .unwrap()
        .unwrap();
    assert!(a.secondary_widget);

    let selection = db.get_widget_selection().await.unwrap();
    assert_eq!(selection.primary.as_deref(), Some(b.id.as_str()));
    assert_eq!(selection.secondary.as_deref(), Some(a.id.as_str()));
}

#[tokio::test]
async fn test_release_only_applies_to_holder() {
    let db = setup_test_db();
    let a = db
        .insert_countdown(CountdownInput {
            primary_widget: true,
            ..input("A")
        })
        .await
        .unwrap();
    let b = db.insert_countdown(input("B")).await.unwrap();

    db.set_widget_slot(&b.id, WidgetSlot::Primary, false)
        .await
        .unwrap();
    let holder = db.get_slot_countdown(WidgetSlot::Primary).await.unwrap();
    assert_eq!(holder.map(|c| c.id), Some(a.id.clone()));

    db.set_widget_slot(&a.id, WidgetSlot::Primary, false)
        .await
        .unwrap();
    assert!(db
        .get_slot_countdown(WidgetSlot::Primary)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_set_slot_on_missing_countdown() {
    let db = setup_test_db();
    let result = db
        .set_widget_slot("missing", WidgetSlot::Primary, true)
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(db.get_widget_selection().await.unwrap().primary, None);
}

#[tokio::test]
async fn test_reorder_rejects_non_permutation() {
    let db = setup_test_db();
    let a = db.insert_countdown(input("A")).await.unwrap();
    let b = db.insert_countdown(input("B")).await.unwrap();

    let duplicate = db
        .reorder_countdowns(vec![a.id.clone(), a.id.clone()])
        .await
        .unwrap();
    assert!(duplicate.is_none());

    let partial = db.reorder_countdowns(vec![b.id.clone()]).await.unwrap();
    assert!(partial.is_none());

    let unknown = db
        .reorder_countdowns(vec![a.id.clone(), "ghost".into()])
        .await
        .unwrap();
    assert!(unknown.is_none());

    let orders: Vec<i64> = db
        .get_countdowns()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.order)
        .collect();
    assert_eq!(orders, vec![1, 2]);
}

#[tokio::test]
async fn test_reopened_file_database_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Remaining.sqlite");

    let id = {
        let db = Database::new(path.clone()).unwrap();
        let created = db
            .insert_countdown(CountdownInput {
                secondary_widget: true,
                ..input("Persisted")
            })
            .await
            .unwrap();
        created.id
    };

    let db = Database::new(path).unwrap();
    let found = db.get_countdown(&id).await.unwrap().unwrap();
    assert_eq!(found.title, "Persisted");
    assert!(found.secondary_widget);
}

fn two_handles_on_one_file(dir: &tempfile::TempDir) -> (Database, Database) {
    let path = dir.path().join("Remaining.sqlite");
    let app = Database::new(path.clone()).unwrap();
    let widget = Database::new(path).unwrap();
    (app, widget)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_from_two_handles_are_serialized() {
    let dir = tempfile::tempdir().unwrap();
    let (app, widget) = two_handles_on_one_file(&dir);

    let mut tasks = JoinSet::new();
    for i in 0..200 {
        let db = if i % 2 == 0 { app.clone() } else { widget.clone() };
        tasks.spawn(async move { db.insert_countdown(input(&format!("Countdown {i}"))).await });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().expect("insert should wait for the other writer");
    }

    let all = widget.get_countdowns().await.unwrap();
    assert_eq!(all.len(), 200);
    let orders: HashSet<i64> = all.iter().map(|c| c.order).collect();
    assert_eq!(orders.len(), 200);
    assert_eq!(orders.iter().min(), Some(&1));
    assert_eq!(orders.iter().max(), Some(&200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_slot_selection_keeps_one_holder() {
    let dir = tempfile::tempdir().unwrap();
    let (app, widget) = two_handles_on_one_file(&dir);

    let mut ids = Vec::new();
    for i in 0..10 {
        ids.push(app.insert_countdown(input(&format!("C{i}"))).await.unwrap().id);
    }

    let mut tasks = JoinSet::new();
    for round in 0..60 {
        let db = if round % 2 == 0 { app.clone() } else { widget.clone() };
        let id = ids[round % ids.len()].clone();
        let slot = if round % 3 == 0 {
            WidgetSlot::Secondary
        } else {
            WidgetSlot::Primary
        };
        tasks.spawn(async move { db.set_widget_slot(&id, slot, true).await });
    }
    while let Some(joined) = tasks.join_next().await {
        assert!(joined.unwrap().expect("slot change should not fail").is_some());
    }

    let all = app.get_countdowns().await.unwrap();
    let selection = widget.get_widget_selection().await.unwrap();
    for slot in [WidgetSlot::Primary, WidgetSlot::Secondary] {
        let holders: Vec<&str> = all
            .iter()
            .filter(|c| c.holds(slot))
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(holders.len(), 1, "{slot:?} has {} holders", holders.len());
        assert_eq!(selection.get(slot), Some(holders[0]));
    }
}
