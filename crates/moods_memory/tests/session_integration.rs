//! Integration tests for ReflectionSession on a real SQLite file.
//!
//! Uses tempfile::TempDir for isolated databases.

use chrono::NaiveDate;
use moods_core::export::ExportFormat;
use moods_core::{FixedClock, KvStore, MoodsConfig, ProgressState};
use moods_memory::{ReflectionSession, SqliteStore};
use std::sync::Arc;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn open(dir: &tempfile::TempDir, clock: Arc<FixedClock>) -> (ReflectionSession, Arc<SqliteStore>) {
    let db_path = dir.path().join("nested").join("moods.db");
    let store = Arc::new(SqliteStore::new(&db_path).await.unwrap());
    let session = ReflectionSession::from_config(&MoodsConfig::default(), store.clone(), clock)
        .await
        .unwrap();
    (session, store)
}

/// Test 1: progress, cursor and log survive a restart
#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::at(day(2024, 1, 1), 9, 0));

    {
        let (session, _store) = open(&dir, clock.clone()).await;
        session.save_reflection("first thought").await.unwrap();
        session.save_reflection("second thought").await.unwrap();
    }

    let (session, _store) = open(&dir, clock.clone()).await;
    assert_eq!(
        session.progress().await,
        ProgressState {
            xp: 20,
            level: 1,
            streak: 1,
            last_entry_date: Some(day(2024, 1, 1)),
        }
    );
    assert_eq!(session.cursor().await.current_question_index, 14);
    let entries = session.entries().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reflection, "first thought");
    assert_eq!(entries[1].reflection, "second thought");
}

/// Test 2: two weeks of daily entries build a streak and cross a level
#[tokio::test]
async fn test_daily_habit_over_two_weeks() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::at(day(2024, 1, 1), 20, 0));
    let mut level_ups = 0;

    for offset in 0..14 {
        clock.set_date(day(2024, 1, 1) + chrono::Duration::days(offset), 20, 0);
        let (session, _store) = open(&dir, clock.clone()).await;
        let outcome = session.save_reflection(&format!("day {offset}")).await.unwrap();
        if outcome.progress.leveled_up {
            level_ups += 1;
        }
    }

    let (session, _store) = open(&dir, clock.clone()).await;
    let progress = session.progress().await;
    assert_eq!(progress.streak, 14);
    assert_eq!(progress.xp, 140);
    assert_eq!(progress.level, 2);
    assert_eq!(level_ups, 1);

    let stats = session.stats().await.unwrap();
    assert_eq!(stats.total_entries, 14);
    assert_eq!(stats.days_active, 14);
    assert_eq!(stats.current_streak, 14);
}

/// Test 3: every entry written on a day is found for that day exactly once
#[tokio::test]
async fn test_appended_entries_found_for_their_day() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::at(day(2024, 3, 10), 7, 0));
    let (session, _store) = open(&dir, clock.clone()).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let outcome = session.save_reflection(&format!("note {i}")).await.unwrap();
        ids.push(outcome.entry.id);
        clock.advance(chrono::Duration::hours(2));
    }

    let today = session.today_entries().await.unwrap();
    for id in &ids {
        assert_eq!(today.iter().filter(|e| &e.id == id).count(), 1);
    }
}

/// Test 4: history search and exports read the persisted log
#[tokio::test]
async fn test_history_and_exports() {
    let dir = tempfile::TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::at(day(2024, 1, 1), 9, 0));
    let (session, store) = open(&dir, clock.clone()).await;

    session.save_reflection("Walked by the river").await.unwrap();
    clock.set_date(day(2024, 1, 2), 9, 0);
    session.save_reflection("Finished the book").await.unwrap();

    let hits = session.history(Some("RIVER")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(session.history(None).await.unwrap()[0].reflection, "Finished the book");

    let json = session.export(ExportFormat::Json).await.unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(doc["totalEntries"], 2);
    assert!(doc.get("xp").is_none());

    let text = session.export(ExportFormat::Text).await.unwrap();
    assert!(text.contains("Total Reflections: 2"));
    assert!(text.contains("Walked by the river"));

    // exporting never writes
    let before = store.get("entries").await.unwrap();
    session.export(ExportFormat::Text).await.unwrap();
    assert_eq!(store.get("entries").await.unwrap(), before);
}
