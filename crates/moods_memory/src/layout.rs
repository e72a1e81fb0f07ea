//! Persisted state layout.
//!
//! Every piece of state lives under its own key. Dates are stored as
//! `YYYY-MM-DD` strings, with `""` meaning "never".

use anyhow::{Context, Result};
use chrono::NaiveDate;
use moods_core::{KvStore, ProgressState, QuestionCursor, ReflectionEntry, Theme};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const ENTRIES: &str = "entries";
pub const XP: &str = "xp";
pub const LEVEL: &str = "level";
pub const STREAK: &str = "streak";
pub const LAST_ENTRY_DATE: &str = "lastEntryDate";
pub const CURRENT_QUESTION_INDEX: &str = "currentQuestionIndex";
pub const LAST_QUESTION_DATE: &str = "lastQuestionDate";
pub const THEME: &str = "theme";

/// Full entry log. A log that exists but cannot be decoded is an error:
/// rewriting it would drop every entry.
pub async fn load_entries(store: &dyn KvStore) -> Result<Vec<ReflectionEntry>> {
    match store.get(ENTRIES).await? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => {
            serde_json::from_value(value).context("Stored entries log could not be decoded")
        }
    }
}

pub async fn load_progress(store: &dyn KvStore) -> Result<ProgressState> {
    let defaults = ProgressState::default();
    let level: u32 = scalar(store, LEVEL, defaults.level).await?;
    Ok(ProgressState {
        xp: scalar(store, XP, defaults.xp).await?,
        level: level.max(1),
        streak: scalar(store, STREAK, defaults.streak).await?,
        last_entry_date: date(store, LAST_ENTRY_DATE).await?,
    })
}

pub async fn load_cursor(store: &dyn KvStore) -> Result<QuestionCursor> {
    Ok(QuestionCursor {
        current_question_index: scalar(store, CURRENT_QUESTION_INDEX, 0).await?,
        last_question_date: date(store, LAST_QUESTION_DATE).await?,
    })
}

pub async fn load_theme(store: &dyn KvStore) -> Result<Theme> {
    scalar(store, THEME, Theme::default()).await
}

pub fn entries_item(entries: &[ReflectionEntry]) -> Result<(String, Value)> {
    let value = serde_json::to_value(entries).context("Failed to serialize entries log")?;
    Ok((ENTRIES.to_string(), value))
}

pub fn progress_items(progress: &ProgressState) -> Vec<(String, Value)> {
    vec![
        (XP.to_string(), Value::from(progress.xp)),
        (LEVEL.to_string(), Value::from(progress.level)),
        (STREAK.to_string(), Value::from(progress.streak)),
        (LAST_ENTRY_DATE.to_string(), date_value(progress.last_entry_date)),
    ]
}

pub fn cursor_items(cursor: &QuestionCursor) -> Vec<(String, Value)> {
    vec![
        (
            CURRENT_QUESTION_INDEX.to_string(),
            Value::from(cursor.current_question_index),
        ),
        (
            LAST_QUESTION_DATE.to_string(),
            date_value(cursor.last_question_date),
        ),
    ]
}

pub fn theme_item(theme: Theme) -> (String, Value) {
    (THEME.to_string(), Value::from(theme.as_str()))
}

fn date_value(date: Option<NaiveDate>) -> Value {
    match date {
        Some(d) => Value::from(d.format("%Y-%m-%d").to_string()),
        None => Value::from(""),
    }
}

/// Decode a scalar, falling back to `default` when it is missing or malformed.
async fn scalar<T: DeserializeOwned>(store: &dyn KvStore, key: &str, default: T) -> Result<T> {
    let Some(value) = store.get(key).await? else {
        return Ok(default);
    };
    match serde_json::from_value(value.clone()) {
        Ok(v) => Ok(v),
        Err(e) => {
            tracing::warn!(key, %value, "Malformed stored value, using default: {}", e);
            Ok(default)
        }
    }
}

async fn date(store: &dyn KvStore, key: &str) -> Result<Option<NaiveDate>> {
    let raw: String = match store.get(key).await? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => return Ok(None),
        Some(other) => {
            tracing::warn!(key, value = %other, "Stored date is not a string, ignoring");
            return Ok(None);
        }
    };
    if raw.is_empty() {
        return Ok(None);
    }
    match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(d) => Ok(Some(d)),
        Err(e) => {
            tracing::warn!(key, value = %raw, "Stored date is malformed, ignoring: {}", e);
            Ok(None)
        }
    }
}
