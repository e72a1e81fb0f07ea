//! Export renderings of the entry log.
//!
//! Both formats are derived only from entries; progress counters are never
//! exported.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{sort_newest_first, ReflectionEntry};
use crate::history::group_by_date;

const TITLE: &str = "Moods - Reflection Export";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }

    /// Suggested download name, e.g. `moods-reflections-2024-01-01.json`.
    pub fn file_name(&self, date: NaiveDate) -> String {
        format!(
            "moods-reflections-{}.{}",
            date.format("%Y-%m-%d"),
            self.extension()
        )
    }
}

/// JSON export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    pub export_date: DateTime<Utc>,
    pub total_entries: usize,
    /// Newest first.
    pub entries: Vec<ReflectionEntry>,
}

impl JsonExport {
    pub fn new(entries: &[ReflectionEntry], exported_at: DateTime<Utc>) -> Self {
        let mut entries = entries.to_vec();
        sort_newest_first(&mut entries);
        Self {
            export_date: exported_at,
            total_entries: entries.len(),
            entries,
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize JSON export")
    }
}

/// Plain-text export: days oldest first, entries within a day in time order.
/// Times are shown in the `local` offset.
pub fn render_text(entries: &[ReflectionEntry], exported_at: DateTime<FixedOffset>) -> String {
    let local = *exported_at.offset();
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&format!("Export Date: {}\n", exported_at.format("%-m/%-d/%Y")));
    out.push_str(&format!("Total Reflections: {}\n", entries.len()));
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    for (date, mut day_entries) in group_by_date(entries) {
        let heading = long_date(date);
        out.push_str(&heading);
        out.push('\n');
        out.push_str(&"-".repeat(heading.chars().count()));
        out.push('\n');

        day_entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        for (i, entry) in day_entries.iter().enumerate() {
            let time = entry.timestamp.with_timezone(&local).format("%-I:%M %p");
            out.push_str(&format!("\n[{}] {}\n", time, entry.question));
            out.push_str(&entry.reflection);
            out.push('\n');
            if i + 1 < day_entries.len() {
                out.push('\n');
            }
        }
        out.push_str("\n\n");
    }
    out
}

/// `Monday, January 1, 2024`
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
