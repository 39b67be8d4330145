use async_trait::async_trait;
use nf_core::{ArticleStorage, Batch, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::StoredState;

/// Process-scoped storage; gone when the process exits.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    store: Arc<RwLock<StoredState>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for InMemoryStorage {
    async fn store_batch(&self, batch: &Batch) -> Result<()> {
        let mut store = self.store.write().await;
        store.last_batch = Some(batch.clone());
        Ok(())
    }

    async fn last_batch(&self) -> Result<Option<Batch>> {
        let store = self.store.read().await;
        Ok(store.last_batch.clone())
    }

    async fn favorites(&self) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.favorites.clone())
    }

    async fn toggle_favorite(&self, url: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.toggle_favorite(url))
    }
}
