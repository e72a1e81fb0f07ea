use anyhow::Result;
use async_trait::async_trait;
use moods_core::KvStore;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local store. Used for `--in-memory` runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_many(&self, items: Vec<(String, serde_json::Value)>) -> Result<()> {
        let mut guard = self.items.write().await;
        guard.extend(items);
        Ok(())
    }
}
