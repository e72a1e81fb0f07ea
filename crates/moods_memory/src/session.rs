//! Reflection Session - the single owner of in-memory reflection state
//!
//! The session loads progress, question cursor and theme once, keeps them in
//! memory, and writes every change back through the [`KvStore`]. All
//! date-based decisions read the injected [`Clock`].
//!
//! A save computes the complete next state first and persists it in one
//! `set_many` call. Only after the store accepts the write is the in-memory
//! state replaced, so a storage failure never leaves a partial update behind.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use moods_core::export::{render_text, ExportFormat, JsonExport};
use moods_core::history::{self, HistoryStats};
use moods_core::{
    append_entry, apply_entry_saved_with, entries_for_date, sort_newest_first, Clock, KvStore,
    MoodsConfig, MoodsError, ProgressRules, ProgressState, ProgressUpdate, QuestionBank,
    QuestionCursor, ReflectionEntry, Theme,
};

use crate::layout;

/// What a successful save produced.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub entry: ReflectionEntry,
    pub progress: ProgressUpdate,
    /// Prompt that will be shown next.
    pub next_question: String,
}

#[derive(Debug, Clone)]
struct SessionState {
    progress: ProgressState,
    cursor: QuestionCursor,
    theme: Theme,
}

pub struct ReflectionSession {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    bank: QuestionBank,
    rules: ProgressRules,

    state: RwLock<SessionState>,

    /// Serializes state-mutating operations (save, day roll-over, theme).
    mutation_lock: Mutex<()>,
}

impl ReflectionSession {
    /// Load persisted state and apply the date-based question reset.
    pub async fn start(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        bank: QuestionBank,
        rules: ProgressRules,
    ) -> Result<Self, MoodsError> {
        let (progress, cursor, theme) = load_state(store.as_ref())
            .await
            .map_err(|e| storage_failure("load state", e))?;

        tracing::info!(
            xp = progress.xp,
            level = progress.level,
            streak = progress.streak,
            "Loaded reflection progress"
        );

        let session = Self {
            store,
            clock,
            bank,
            rules,
            state: RwLock::new(SessionState {
                progress,
                cursor,
                theme,
            }),
            mutation_lock: Mutex::new(()),
        };

        if let Err(e) = session.roll_over_day().await {
            // the date-based prompt is recomputed on the next start anyway
            tracing::warn!("Could not persist today's question cursor: {}", e);
            let today = session.clock.today();
            session
                .state
                .write()
                .await
                .cursor
                .sync_to_date(&session.bank, today);
        }

        Ok(session)
    }

    /// Build a session from config: question bank and XP rules are validated here.
    pub async fn from_config(
        config: &MoodsConfig,
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MoodsError> {
        let bank = config.question_bank()?;
        let rules = config.progress_rules()?;
        Self::start(store, clock, bank, rules).await
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn rules(&self) -> &ProgressRules {
        &self.rules
    }

    pub async fn current_question(&self) -> String {
        let state = self.state.read().await;
        state.cursor.current(&self.bank).to_string()
    }

    pub async fn progress(&self) -> ProgressState {
        self.state.read().await.progress.clone()
    }

    pub async fn cursor(&self) -> QuestionCursor {
        self.state.read().await.cursor.clone()
    }

    pub async fn theme(&self) -> Theme {
        self.state.read().await.theme
    }

    /// Re-apply the date-based question reset. Long-lived sessions call this
    /// when the calendar may have moved on. Returns whether the prompt changed.
    pub async fn roll_over_day(&self) -> Result<bool, MoodsError> {
        let _guard = self.mutation_lock.lock().await;
        let today = self.clock.today();

        let mut next = self.state.read().await.cursor.clone();
        if !next.sync_to_date(&self.bank, today) {
            return Ok(false);
        }

        self.store
            .set_many(layout::cursor_items(&next))
            .await
            .map_err(|e| storage_failure("persist question cursor", e))?;

        tracing::info!(
            index = next.current_question_index,
            %today,
            "Question cursor reset for new day"
        );
        self.state.write().await.cursor = next;
        Ok(true)
    }

    /// Save a reflection for the current prompt.
    ///
    /// Blank text is rejected before any I/O. On success the entry is
    /// appended, progress is updated, and the cursor moves to the next prompt.
    pub async fn save_reflection(&self, text: &str) -> Result<SaveOutcome, MoodsError> {
        let _guard = self.mutation_lock.lock().await;
        let now = self.clock.now();
        let today = now.date_naive();

        let (question, prior, mut cursor) = {
            let state = self.state.read().await;
            (
                state.cursor.current(&self.bank).to_string(),
                state.progress.clone(),
                state.cursor.clone(),
            )
        };

        let entry = ReflectionEntry::new(question, text, now)?;

        let entries = layout::load_entries(self.store.as_ref())
            .await
            .map_err(|e| storage_failure("load entries", e))?;
        let entries = append_entry(entries, entry.clone())?;

        let update = apply_entry_saved_with(&self.rules, &prior, today);
        cursor.advance(&self.bank, today);

        let mut items = vec![layout::entries_item(&entries)?];
        items.extend(layout::progress_items(&update.state));
        items.extend(layout::cursor_items(&cursor));

        self.store
            .set_many(items)
            .await
            .map_err(|e| storage_failure("save reflection", e))?;

        let next_question = cursor.current(&self.bank).to_string();
        {
            let mut state = self.state.write().await;
            state.progress = update.state.clone();
            state.cursor = cursor;
        }

        tracing::info!(
            id = %entry.id,
            xp = update.state.xp,
            level = update.state.level,
            streak = update.state.streak,
            total_entries = entries.len(),
            "Reflection saved"
        );
        if update.leveled_up {
            tracing::info!(level = update.state.level, "Level up");
        }

        Ok(SaveOutcome {
            entry,
            progress: update,
            next_question,
        })
    }

    /// The full log in stored order.
    pub async fn entries(&self) -> Result<Vec<ReflectionEntry>, MoodsError> {
        layout::load_entries(self.store.as_ref())
            .await
            .map_err(|e| storage_failure("load entries", e))
    }

    /// Today's entries, newest first.
    pub async fn today_entries(&self) -> Result<Vec<ReflectionEntry>, MoodsError> {
        let entries = self.entries().await?;
        let mut today = entries_for_date(&entries, self.clock.today());
        sort_newest_first(&mut today);
        Ok(today)
    }

    /// Entries matching `search` (everything when `None`), newest first.
    pub async fn history(&self, search: Option<&str>) -> Result<Vec<ReflectionEntry>, MoodsError> {
        let entries = self.entries().await?;
        Ok(history::search(&entries, search.unwrap_or("")))
    }

    pub async fn stats(&self) -> Result<HistoryStats, MoodsError> {
        let entries = self.entries().await?;
        Ok(HistoryStats::compute(&entries, self.clock.today()))
    }

    /// Render the log for export. Progress counters are not included.
    pub async fn export(&self, format: ExportFormat) -> Result<String, MoodsError> {
        let entries = self.entries().await?;
        let now = self.clock.now();
        match format {
            ExportFormat::Json => {
                let doc = JsonExport::new(&entries, now.with_timezone(&chrono::Utc));
                Ok(doc.to_pretty_json()?)
            }
            ExportFormat::Text => Ok(render_text(&entries, now)),
        }
    }

    /// Flip light/dark and persist it.
    pub async fn toggle_theme(&self) -> Result<Theme, MoodsError> {
        let _guard = self.mutation_lock.lock().await;
        let next = self.state.read().await.theme.toggled();
        self.store
            .set_many(vec![layout::theme_item(next)])
            .await
            .map_err(|e| storage_failure("save theme", e))?;
        self.state.write().await.theme = next;
        Ok(next)
    }
}

async fn load_state(
    store: &dyn KvStore,
) -> anyhow::Result<(ProgressState, QuestionCursor, Theme)> {
    let progress = layout::load_progress(store).await?;
    let cursor = layout::load_cursor(store).await?;
    let theme = layout::load_theme(store).await?;
    Ok((progress, cursor, theme))
}

fn storage_failure(action: &str, e: anyhow::Error) -> MoodsError {
    tracing::error!("Failed to {}: {:#}", action, e);
    MoodsError::Storage(e)
}
