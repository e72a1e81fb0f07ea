use anyhow::{Context, Result};
use async_trait::async_trait;
use moods_core::KvStore;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite};
use std::path::Path;

/// SQLite-backed key-value store. One row per key, values stored as JSON text.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let in_memory = db_path.as_os_str() == ":memory:";

        if !in_memory {
            if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        // every pooled connection to :memory: would open its own empty database
        let max_connections = if in_memory { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create kv_store table")?;

        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query("SELECT value_json FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to query key '{}'", key))?;

        match row {
            Some(row) => {
                let json: String = row.get("value_json");
                let value = serde_json::from_str(&json)
                    .with_context(|| format!("Stored value for '{}' is not valid JSON", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Writes all items in one transaction.
    async fn set_many(&self, items: Vec<(String, serde_json::Value)>) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin kv_store transaction")?;

        for (key, value) in &items {
            let json = serde_json::to_string(value)
                .with_context(|| format!("Failed to serialize value for '{}'", key))?;
            sqlx::query(
                "INSERT INTO kv_store (key, value_json, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(&json)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to write key '{}'", key))?;
        }

        tx.commit()
            .await
            .context("Failed to commit kv_store transaction")?;

        tracing::debug!(keys = items.len(), "kv_store write committed");
        Ok(())
    }
}
