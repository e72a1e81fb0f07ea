//! Reflection entries and the append-only entry log.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MoodsError;

/// A single saved reflection.
///
/// `question` is a snapshot of the prompt text, not an index, because the
/// question list may change between releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionEntry {
    pub id: String,
    /// Local calendar day the entry was written on.
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub reflection: String,
}

impl ReflectionEntry {
    /// Build an entry from raw user text. The text is trimmed; blank text is
    /// rejected before anything else happens.
    pub fn new(
        question: impl Into<String>,
        reflection: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<Self, MoodsError> {
        let reflection = reflection.trim();
        if reflection.is_empty() {
            return Err(MoodsError::EmptyReflection);
        }
        Ok(Self {
            id: Uuid::now_v7().to_string(),
            date: now.date_naive(),
            timestamp: now.with_timezone(&Utc),
            question: question.into(),
            reflection: reflection.to_string(),
        })
    }

    /// First `max_chars` characters of the reflection, with an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.reflection.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }
}

/// Append `entry` to the log. Existing entries are never reordered or removed.
pub fn append_entry(
    mut entries: Vec<ReflectionEntry>,
    entry: ReflectionEntry,
) -> Result<Vec<ReflectionEntry>, MoodsError> {
    if entry.reflection.trim().is_empty() {
        return Err(MoodsError::EmptyReflection);
    }
    entries.push(entry);
    Ok(entries)
}

/// Entries written on `date`, in log order.
pub fn entries_for_date(entries: &[ReflectionEntry], date: NaiveDate) -> Vec<ReflectionEntry> {
    entries.iter().filter(|e| e.date == date).cloned().collect()
}

/// Display order: newest timestamp first. Stable for equal timestamps.
pub fn sort_newest_first(entries: &mut [ReflectionEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().fixed_offset()
    }

    fn entry(text: &str, now: DateTime<FixedOffset>) -> ReflectionEntry {
        ReflectionEntry::new("What made you smile today?", text, now).unwrap()
    }

    #[test]
    fn test_new_entry_trims_and_snapshots_question() {
        let e = entry("  a quiet walk \n", at(2024, 1, 1, 8));
        assert_eq!(e.reflection, "a quiet walk");
        assert_eq!(e.question, "What made you smile today?");
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(!e.id.is_empty());
    }

    #[test]
    fn test_new_entry_rejects_blank_text() {
        let err = ReflectionEntry::new("q", " \t\n ", at(2024, 1, 1, 8)).unwrap_err();
        assert!(matches!(err, MoodsError::EmptyReflection));
        assert!(err.is_validation());
    }

    #[test]
    fn test_ids_are_unique() {
        let now = at(2024, 1, 1, 8);
        let a = entry("one", now);
        let b = entry("two", now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_append_preserves_order() {
        let first = entry("first", at(2024, 1, 1, 8));
        let second = entry("second", at(2024, 1, 1, 9));
        let log = append_entry(Vec::new(), first.clone()).unwrap();
        let log = append_entry(log, second.clone()).unwrap();
        assert_eq!(log, vec![first, second]);
    }

    #[test]
    fn test_append_rejects_blank_entry_and_leaves_log_alone() {
        let kept = entry("kept", at(2024, 1, 1, 8));
        let mut blank = kept.clone();
        blank.reflection = "   ".to_string();
        let err = append_entry(vec![kept], blank).unwrap_err();
        assert!(matches!(err, MoodsError::EmptyReflection));
    }

    #[test]
    fn test_entries_for_date_filters_in_log_order() {
        let a = entry("a", at(2024, 1, 1, 10));
        let b = entry("b", at(2024, 1, 2, 10));
        let c = entry("c", at(2024, 1, 1, 7));
        let log = vec![a.clone(), b, c.clone()];
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(entries_for_date(&log, day), vec![a, c]);
    }

    #[test]
    fn test_sort_newest_first() {
        let early = entry("early", at(2024, 1, 1, 7));
        let late = entry("late", at(2024, 1, 1, 21));
        let mut list = vec![early.clone(), late.clone()];
        sort_newest_first(&mut list);
        assert_eq!(list, vec![late, early]);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(120);
        let e = entry(&long, at(2024, 1, 1, 8));
        assert_eq!(e.preview(100).len(), 103);
        assert!(e.preview(100).ends_with("..."));
        assert_eq!(entry("short", at(2024, 1, 1, 8)).preview(100), "short");
    }

    #[test]
    fn test_serializes_date_as_plain_day() {
        let e = entry("hello", at(2024, 3, 9, 12));
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["date"], "2024-03-09");
        let back: ReflectionEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}
