use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::MoodsError;
use crate::progress::ProgressRules;
use crate::questions::QuestionBank;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoodsConfig {
    pub storage: StorageConfig,
    pub progress: ProgressConfig,
    pub questions: QuestionsConfig,
}

impl MoodsConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: MoodsConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if file doesn't exist, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MOODS_DB_PATH") {
            self.storage.db_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("MOODS_STORAGE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "sqlite" => self.storage.backend = StorageBackend::Sqlite,
                "memory" => self.storage.backend = StorageBackend::Memory,
                other => tracing::warn!("Ignoring unknown MOODS_STORAGE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = std::env::var("MOODS_XP_PER_ENTRY") {
            if let Ok(n) = v.parse() {
                self.progress.xp_per_entry = n;
            }
        }
        if let Ok(v) = std::env::var("MOODS_XP_PER_LEVEL") {
            if let Ok(n) = v.parse() {
                self.progress.xp_per_level = n;
            }
        }
    }

    /// Validated XP curve. A zero level size is a configuration error.
    pub fn progress_rules(&self) -> Result<ProgressRules, MoodsError> {
        ProgressRules::new(self.progress.xp_per_entry, self.progress.xp_per_level)
    }

    /// Custom prompts when configured, the built-in list otherwise.
    pub fn question_bank(&self) -> Result<QuestionBank, MoodsError> {
        match &self.questions.prompts {
            None => Ok(QuestionBank::default()),
            Some(prompts) => {
                let prompts: Vec<String> = prompts
                    .iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect();
                QuestionBank::new(prompts)
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database file. `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Durable SQLite file
    #[default]
    Sqlite,
    /// Process-local; everything is lost on exit
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub xp_per_entry: u64,
    pub xp_per_level: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        let rules = ProgressRules::default();
        Self {
            xp_per_entry: rules.xp_per_entry,
            xp_per_level: rules.xp_per_level,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuestionsConfig {
    /// Replaces the built-in prompts when set. An empty list is rejected.
    pub prompts: Option<Vec<String>>,
}

// ============================================================================
// Tests
// ============================================================================
