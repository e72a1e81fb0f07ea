//! Read-side views over the entry log: statistics, search and grouping.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::entry::{sort_newest_first, ReflectionEntry};

/// Summary shown at the top of the history view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_entries: usize,
    /// Distinct calendar days with at least one entry.
    pub days_active: usize,
    /// Consecutive days ending today, or ending on the latest entry day when
    /// today has no entry yet.
    pub current_streak: usize,
}

impl HistoryStats {
    pub fn compute(entries: &[ReflectionEntry], today: NaiveDate) -> Self {
        let days: BTreeSet<NaiveDate> = entries.iter().map(|e| e.date).collect();
        Self {
            total_entries: entries.len(),
            days_active: days.len(),
            current_streak: streak_from_days(&days, today),
        }
    }
}

fn streak_from_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> usize {
    let Some(&latest) = days.iter().next_back() else {
        return 0;
    };
    let mut cursor = if days.contains(&today) { today } else { latest };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Case-insensitive match against reflection text or question. A blank term
/// returns every entry. Results are newest first.
pub fn search(entries: &[ReflectionEntry], term: &str) -> Vec<ReflectionEntry> {
    let needle = term.trim().to_lowercase();
    let mut found: Vec<ReflectionEntry> = entries
        .iter()
        .filter(|e| {
            needle.is_empty()
                || e.reflection.to_lowercase().contains(&needle)
                || e.question.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    sort_newest_first(&mut found);
    found
}

/// Entries bucketed by calendar day. Within a day, log order is kept.
pub fn group_by_date(entries: &[ReflectionEntry]) -> BTreeMap<NaiveDate, Vec<ReflectionEntry>> {
    let mut groups: BTreeMap<NaiveDate, Vec<ReflectionEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.date).or_default().push(entry.clone());
    }
    groups
}
