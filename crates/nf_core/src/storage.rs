use async_trait::async_trait;
use crate::feed::Batch;
use crate::types::{Article, ArticleId};
use crate::{Error, Result};

/// Best-effort local cache for the last assembled batch and the user's
/// favorites. Not a source of truth.
#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Replace the last batch
    async fn store_batch(&self, batch: &Batch) -> Result<()>;

    /// The most recently stored batch, if any
    async fn last_batch(&self) -> Result<Option<Batch>>;

    /// Resolve an article of the last batch by id
    async fn lookup(&self, id: ArticleId) -> Result<Article> {
        match self.last_batch().await? {
            Some(batch) => batch.lookup(id).cloned(),
            None => Err(Error::NotFound(id)),
        }
    }

    /// Favorite article urls, in insertion order
    async fn favorites(&self) -> Result<Vec<String>>;

    /// Adds the url if absent, removes it otherwise. Returns whether the url
    /// is a favorite afterwards.
    async fn toggle_favorite(&self, url: &str) -> Result<bool>;
}
