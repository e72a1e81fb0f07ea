//! Daily question selection.
//!
//! The default prompt for a day is a pure function of the date string, so
//! every install shows the same question on the same day without talking to
//! a server. After each saved entry the cursor moves to the next prompt and
//! stays there until the calendar day changes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MoodsError;

const DEFAULT_QUESTIONS: [&str; 20] = [
    "What are you grateful for today?",
    "What's on your mind?",
    "What's one small win you had today?",
    "How are you feeling right now?",
    "What challenged you today and how did you handle it?",
    "What made you smile today?",
    "What's something you learned about yourself recently?",
    "What are you looking forward to?",
    "What would you like to let go of?",
    "How did you show kindness today?",
    "What's something that inspired you lately?",
    "What progress did you make toward your goals?",
    "What would you tell your past self?",
    "What are you proud of accomplishing?",
    "How did you take care of yourself today?",
    "What connections did you make with others?",
    "What creative thoughts crossed your mind?",
    "What brought you peace today?",
    "What would you like to remember about today?",
    "How did you grow today?",
];

/// Ordered, non-empty list of reflection prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<String>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        }
    }
}

impl QuestionBank {
    pub fn new(questions: Vec<String>) -> Result<Self, MoodsError> {
        if questions.is_empty() {
            return Err(MoodsError::EmptyQuestionBank);
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed bank; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.questions[index % self.questions.len()]
    }

    /// Index of the default prompt for `date`.
    pub fn index_for_date(&self, date: NaiveDate) -> usize {
        question_index_for_date(&date.format("%Y-%m-%d").to_string(), self.len())
            .unwrap_or_default()
    }
}

/// Rolling hash over the UTF-16 code units of `date`, folded into an `i32`
/// after every step, then reduced into `[0, count)` via its absolute value.
pub fn question_index_for_date(date: &str, count: usize) -> Result<usize, MoodsError> {
    if count == 0 {
        return Err(MoodsError::EmptyQuestionBank);
    }
    let mut hash: i32 = 0;
    for unit in date.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    // i64 so that |i32::MIN| does not overflow
    let magnitude = i64::from(hash).unsigned_abs();
    Ok((magnitude % count as u64) as usize)
}

/// Which prompt is showing, and on which day it was last assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCursor {
    pub current_question_index: usize,
    pub last_question_date: Option<NaiveDate>,
}

impl QuestionCursor {
    /// Reset to the date-based prompt when `today` differs from the day the
    /// cursor was last assigned. An index that no longer fits the bank is
    /// reset the same way. Returns whether the cursor changed.
    pub fn sync_to_date(&mut self, bank: &QuestionBank, today: NaiveDate) -> bool {
        let stale_day = self.last_question_date != Some(today);
        let out_of_range = self.current_question_index >= bank.len();
        if !stale_day && !out_of_range {
            return false;
        }
        if out_of_range && !stale_day {
            tracing::warn!(
                index = self.current_question_index,
                questions = bank.len(),
                "Question index out of range, resetting to date-based prompt"
            );
        }
        self.current_question_index = bank.index_for_date(today);
        self.last_question_date = Some(today);
        true
    }

    /// Move to the next prompt, wrapping at the end of the bank.
    pub fn advance(&mut self, bank: &QuestionBank, today: NaiveDate) {
        self.current_question_index = (self.current_question_index + 1) % bank.len();
        self.last_question_date = Some(today);
    }

    pub fn current<'a>(&self, bank: &'a QuestionBank) -> &'a str {
        bank.get(self.current_question_index)
    }
}
