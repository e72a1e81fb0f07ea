pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod history;
pub mod progress;
pub mod questions;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{MoodsConfig, StorageBackend};
pub use entry::{append_entry, entries_for_date, sort_newest_first, ReflectionEntry};
pub use error::MoodsError;
pub use export::{ExportFormat, JsonExport};
pub use history::HistoryStats;
pub use progress::{
    apply_entry_saved, apply_entry_saved_with, ProgressRules, ProgressState, ProgressUpdate,
};
pub use questions::{question_index_for_date, QuestionBank, QuestionCursor};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// UI colour scheme preference. Lives outside the progress model but is
/// persisted through the same store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value persistence backend.
///
/// Values are JSON documents. Implementations decide where they live; the
/// session never depends on which backend is active.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a single key. Absent keys are `Ok(None)`, not errors.
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;

    /// Write several keys together. Backends that support transactions
    /// must apply either all of them or none.
    async fn set_many(&self, items: Vec<(String, serde_json::Value)>) -> anyhow::Result<()>;

    async fn set(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        self.set_many(vec![(key.to_string(), value)]).await
    }
}
