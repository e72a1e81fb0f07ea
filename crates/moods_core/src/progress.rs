//! Experience, level and day-streak tracking.
//!
//! Progress is derived only from the act of saving entries. The update is a
//! pure function of the prior state and today's date; persisting the result
//! is the caller's job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MoodsError;

/// Persisted gamification counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub xp: u64,
    /// Starts at 1, never decreases.
    pub level: u32,
    /// Consecutive calendar days with at least one entry. 0 before the first entry.
    pub streak: u32,
    /// Day of the most recent entry that touched the streak.
    pub last_entry_date: Option<NaiveDate>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            streak: 0,
            last_entry_date: None,
        }
    }
}

impl ProgressState {
    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self, rules: &ProgressRules) -> u64 {
        (u64::from(self.level) * rules.xp_per_level).saturating_sub(self.xp)
    }
}

/// Tunables for the XP curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressRules {
    pub xp_per_entry: u64,
    pub xp_per_level: u64,
}

impl Default for ProgressRules {
    fn default() -> Self {
        Self {
            xp_per_entry: 10,
            xp_per_level: 100,
        }
    }
}

impl ProgressRules {
    pub fn new(xp_per_entry: u64, xp_per_level: u64) -> Result<Self, MoodsError> {
        if xp_per_level == 0 {
            return Err(MoodsError::InvalidProgressRules(
                "xp_per_level must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            xp_per_entry,
            xp_per_level,
        })
    }
}

/// Result of applying one saved entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub state: ProgressState,
    pub leveled_up: bool,
    /// Streak went up, or was started from nothing.
    pub streak_increased: bool,
}

impl ProgressUpdate {
    /// Streak length worth celebrating. A fresh one-day streak is not.
    pub fn streak_milestone(&self) -> Option<u32> {
        (self.streak_increased && self.state.streak > 1).then_some(self.state.streak)
    }
}

/// Apply one saved entry under the default rules (+10 XP, 100 XP per level).
pub fn apply_entry_saved(prior: &ProgressState, today: NaiveDate) -> ProgressUpdate {
    apply_entry_saved_with(&ProgressRules::default(), prior, today)
}

pub fn apply_entry_saved_with(
    rules: &ProgressRules,
    prior: &ProgressState,
    today: NaiveDate,
) -> ProgressUpdate {
    let mut next = prior.clone();

    next.xp = prior.xp.saturating_add(rules.xp_per_entry);
    // xp_per_level == 0 is rejected by ProgressRules::new
    let per_level = rules.xp_per_level.max(1);
    // smallest level whose upper bound (level * per_level) is above xp
    let earned = u32::try_from(next.xp / per_level)
        .unwrap_or(u32::MAX)
        .saturating_add(1);
    next.level = prior.level.max(earned);

    match prior.last_entry_date {
        None => {
            next.streak = 1;
            next.last_entry_date = Some(today);
        }
        Some(last) => match (today - last).num_days() {
            0 => {}
            1 => {
                next.streak = prior.streak.saturating_add(1);
                next.last_entry_date = Some(today);
            }
            // gaps and clocks moved backwards both restart the streak
            _ => {
                next.streak = 1;
                next.last_entry_date = Some(today);
            }
        },
    }

    let streak_increased =
        next.streak > prior.streak || (prior.last_entry_date.is_none() && next.streak == 1);

    ProgressUpdate {
        leveled_up: next.level > prior.level,
        streak_increased,
        state: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(xp: u64, level: u32, streak: u32, last: Option<NaiveDate>) -> ProgressState {
        ProgressState {
            xp,
            level,
            streak,
            last_entry_date: last,
        }
    }

    #[test]
    fn test_first_entry_starts_everything() {
        let update = apply_entry_saved(&ProgressState::default(), day(2024, 1, 1));
        assert_eq!(update.state, state(10, 1, 1, Some(day(2024, 1, 1))));
        assert!(!update.leveled_up);
        assert!(update.streak_increased);
        assert_eq!(update.streak_milestone(), None);
    }

    #[test]
    fn test_level_boundary_is_crossed_at_exactly_level_times_hundred() {
        let prior = state(90, 1, 3, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 1));
        assert_eq!(update.state.xp, 100);
        assert_eq!(update.state.level, 2);
        assert!(update.leveled_up);
    }

    #[test]
    fn test_no_level_up_below_boundary() {
        let prior = state(80, 1, 1, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 1));
        assert_eq!(update.state.level, 1);
        assert!(!update.leveled_up);
    }

    #[test]
    fn test_large_increment_crosses_several_levels() {
        let rules = ProgressRules::new(350, 100).unwrap();
        let update = apply_entry_saved_with(&rules, &ProgressState::default(), day(2024, 1, 1));
        assert_eq!(update.state.xp, 350);
        assert_eq!(update.state.level, 4);
        assert!(update.leveled_up);
    }

    #[test]
    fn test_huge_rules_and_xp_saturate_instead_of_overflowing() {
        let rules = ProgressRules::new(u64::MAX, u64::MAX / 2).unwrap();
        let update = apply_entry_saved_with(&rules, &ProgressState::default(), day(2024, 1, 1));
        assert_eq!(update.state.xp, u64::MAX);
        assert_eq!(update.state.level, 3);
        assert!(update.leveled_up);

        let prior = state(u64::MAX - 5, 1, 1, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 1));
        assert_eq!(update.state.xp, u64::MAX);
        assert_eq!(update.state.level, u32::MAX);
    }

    #[test]
    fn test_next_day_extends_streak() {
        let prior = state(30, 1, 3, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 2));
        assert_eq!(update.state.streak, 4);
        assert_eq!(update.state.last_entry_date, Some(day(2024, 1, 2)));
        assert!(update.streak_increased);
        assert_eq!(update.streak_milestone(), Some(4));
    }

    #[test]
    fn test_gap_resets_streak() {
        let prior = state(30, 1, 3, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 5));
        assert_eq!(update.state.streak, 1);
        assert_eq!(update.state.last_entry_date, Some(day(2024, 1, 5)));
        assert!(!update.streak_increased);
        assert_eq!(update.streak_milestone(), None);
    }

    #[test]
    fn test_same_day_keeps_streak_and_date() {
        let prior = state(30, 1, 3, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 1));
        assert_eq!(update.state.streak, 3);
        assert_eq!(update.state.last_entry_date, Some(day(2024, 1, 1)));
        assert_eq!(update.state.xp, 40);
        assert!(!update.streak_increased);
    }

    #[test]
    fn test_clock_moved_backwards_resets_streak() {
        let prior = state(30, 1, 5, Some(day(2024, 1, 10)));
        let update = apply_entry_saved(&prior, day(2024, 1, 9));
        assert_eq!(update.state.streak, 1);
        assert_eq!(update.state.last_entry_date, Some(day(2024, 1, 9)));
    }

    #[test]
    fn test_streak_across_month_and_leap_day() {
        let prior = state(0, 1, 7, Some(day(2024, 2, 28)));
        let leap = apply_entry_saved(&prior, day(2024, 2, 29));
        assert_eq!(leap.state.streak, 8);
        let march = apply_entry_saved(&leap.state, day(2024, 3, 1));
        assert_eq!(march.state.streak, 9);
    }

    #[test]
    fn test_restart_after_reset_is_not_celebrated() {
        let prior = state(30, 1, 0, Some(day(2024, 1, 1)));
        let update = apply_entry_saved(&prior, day(2024, 1, 9));
        assert_eq!(update.state.streak, 1);
        assert!(update.streak_increased);
        assert_eq!(update.streak_milestone(), None);
    }

    #[test]
    fn test_zero_xp_per_level_is_rejected() {
        let err = ProgressRules::new(10, 0).unwrap_err();
        assert!(matches!(err, MoodsError::InvalidProgressRules(_)));
    }

    #[test]
    fn test_xp_to_next_level() {
        let rules = ProgressRules::default();
        assert_eq!(state(130, 2, 1, None).xp_to_next_level(&rules), 70);
        assert_eq!(ProgressState::default().xp_to_next_level(&rules), 100);
    }
}
