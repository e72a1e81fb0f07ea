//! Plain-text views printed by the CLI.

use chrono::{Duration, Local, NaiveDate};
use moods_core::export::long_date;
use moods_core::history::group_by_date;
use moods_core::{HistoryStats, ProgressRules, ProgressState, ReflectionEntry};
use moods_memory::SaveOutcome;

const PREVIEW_CHARS: usize = 100;

pub fn today(
    date: NaiveDate,
    question: &str,
    progress: &ProgressState,
    rules: &ProgressRules,
    entries: &[ReflectionEntry],
) -> String {
    let mut out = format!(
        "{}\n\n  {}\n\n{}\n",
        long_date(date),
        question,
        progress_line(progress, rules)
    );

    if !entries.is_empty() {
        out.push_str("\nToday's Reflections\n");
        for entry in entries {
            out.push_str(&format!(
                "  {}  {}\n",
                entry.timestamp.with_timezone(&Local).format("%H:%M"),
                entry.preview(PREVIEW_CHARS)
            ));
        }
    }
    out
}

pub fn saved(outcome: &SaveOutcome) -> String {
    let mut out = String::from("Reflection saved! ✨\n");
    let progress = &outcome.progress;
    if progress.leveled_up {
        out.push_str(&format!(
            "Level up! You reached level {}.\n",
            progress.state.level
        ));
    }
    if let Some(days) = progress.streak_milestone() {
        out.push_str(&format!("🔥 {days}-day streak! Keep it going.\n"));
    }
    out.push_str(&format!("Next question: {}\n", outcome.next_question));
    out
}

/// Entries grouped by day, newest day first.
pub fn history(entries: &[ReflectionEntry], today: NaiveDate) -> String {
    if entries.is_empty() {
        return "No reflections yet.\n".to_string();
    }
    let mut out = String::new();
    for (date, mut day_entries) in group_by_date(entries).into_iter().rev() {
        out.push_str(&day_label(date, today));
        out.push('\n');
        day_entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        for entry in day_entries {
            let time = entry.timestamp.with_timezone(&Local).format("%H:%M");
            out.push_str(&format!("  [{}] \"{}\"\n", time, entry.question));
            out.push_str(&format!("    {}\n", entry.reflection));
        }
        out.push('\n');
    }
    out
}

pub fn stats(stats: &HistoryStats, progress: &ProgressState, rules: &ProgressRules) -> String {
    format!(
        "Total entries:  {}\nDays active:    {}\nCurrent streak: {}\n{}\n",
        stats.total_entries,
        stats.days_active,
        stats.current_streak,
        progress_line(progress, rules)
    )
}

fn progress_line(progress: &ProgressState, rules: &ProgressRules) -> String {
    format!(
        "Level {} · {} XP ({} to next) · streak {}",
        progress.level,
        progress.xp,
        progress.xp_to_next_level(rules),
        progress.streak
    )
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today - Duration::days(1) {
        "Yesterday".to_string()
    } else {
        long_date(date)
    }
}
