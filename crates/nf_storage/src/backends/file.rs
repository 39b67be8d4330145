use async_trait::async_trait;
use nf_core::{ArticleStorage, Batch, Result};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;

use super::StoredState;

/// JSON document on disk. Survives restarts but stays a best-effort cache:
/// an unreadable document is treated as empty and overwritten on the next
/// write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoredState> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoredState::default()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!("Ignoring unreadable state file {}: {}", self.path.display(), e);
                Ok(StoredState::default())
            }
        }
    }

    async fn save(&self, state: &StoredState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ArticleStorage for FileStorage {
    async fn store_batch(&self, batch: &Batch) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut state = self.load().await?;
        state.last_batch = Some(batch.clone());
        self.save(&state).await
    }

    async fn last_batch(&self) -> Result<Option<Batch>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.last_batch)
    }

    async fn favorites(&self) -> Result<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.favorites)
    }

    async fn toggle_favorite(&self, url: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut state = self.load().await?;
        let favorite = state.toggle_favorite(url);
        self.save(&state).await?;
        Ok(favorite)
    }
}
