use thiserror::Error;

/// Failures surfaced by the reflection model and the session that drives it.
#[derive(Debug, Error)]
pub enum MoodsError {
    /// Reflection text was empty after trimming. Nothing was mutated.
    #[error("reflection is empty; write something before saving")]
    EmptyReflection,

    /// The configured question list has no prompts.
    #[error("question bank is empty")]
    EmptyQuestionBank,

    #[error("invalid progress rules: {0}")]
    InvalidProgressRules(String),

    /// The key-value store rejected a read or write.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl MoodsError {
    /// Whether the user can fix this by changing their input.
    pub fn is_validation(&self) -> bool {
        matches!(self, MoodsError::EmptyReflection)
    }
}
