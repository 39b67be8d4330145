use nf_core::{
    Article, ArticleId, ArticleStorage, Batch, FeedQuery, FeedRequest, FetchCursor, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::assembler::FeedAssembler;
use crate::logging::Logger;

/// Assembler plus the caller-side state around it: one cursor per query,
/// the last assembled batch, and the storage that batch is mirrored into.
///
/// The cursor map lock is held for the whole assembly, so refreshes issued
/// while another one is in flight wait instead of racing on the cursor.
pub struct FeedService {
    assembler: FeedAssembler,
    storage: Arc<dyn ArticleStorage>,
    defaults: FeedRequest,
    cursors: Mutex<HashMap<FeedQuery, FetchCursor>>,
    // Lookups resolve here first; storage only covers batches from earlier runs
    last: RwLock<Option<Batch>>,
    logger: Logger,
}

impl FeedService {
    pub fn new(assembler: FeedAssembler, storage: Arc<dyn ArticleStorage>, defaults: FeedRequest) -> Self {
        Self {
            assembler,
            storage,
            defaults,
            cursors: Mutex::new(HashMap::new()),
            last: RwLock::new(None),
            logger: Logger::new().with_prefix("[STORE]"),
        }
    }

    pub fn source_name(&self) -> &str {
        self.assembler.source_name()
    }

    /// Assembles the next batch for `query`, resuming where the previous
    /// batch for the same query stopped.
    pub async fn refresh(&self, query: FeedQuery, count: Option<usize>) -> Result<Batch> {
        self.refresh_at(query, count, None).await
    }

    /// Like [`refresh`](Self::refresh), starting from `page` when given.
    pub async fn refresh_at(&self, query: FeedQuery, count: Option<usize>, page: Option<u32>) -> Result<Batch> {
        let mut cursors = self.cursors.lock().await;

        let cursor = match page {
            Some(page) => FetchCursor::at(page),
            None => match cursors.get(&query) {
                Some(cursor) => *cursor,
                None => self.stored_cursor(&query).await,
            },
        };

        let mut request = self.defaults.clone().with_query(query.clone());
        if let Some(count) = count {
            request.target_count = count;
        }

        let batch = self.assembler.assemble(cursor, &request).await?;
        cursors.insert(query, batch.cursor);
        *self.last.write().await = Some(batch.clone());

        if let Err(e) = self.storage.store_batch(&batch).await {
            self.logger.warn(&format!("Failed to mirror batch to storage: {}", e));
        }
        Ok(batch)
    }

    /// Resolves an article of the most recently assembled batch, falling back
    /// to the stored batch when nothing was assembled in this process.
    pub async fn lookup(&self, id: ArticleId) -> Result<Article> {
        if let Some(batch) = self.last.read().await.as_ref() {
            return batch.lookup(id).cloned();
        }
        self.storage.lookup(id).await
    }

    pub async fn last_batch(&self) -> Result<Option<Batch>> {
        if let Some(batch) = self.last.read().await.as_ref() {
            return Ok(Some(batch.clone()));
        }
        self.storage.last_batch().await
    }

    pub async fn favorites(&self) -> Result<Vec<String>> {
        self.storage.favorites().await
    }

    pub async fn toggle_favorite(&self, url: &str) -> Result<bool> {
        self.storage.toggle_favorite(url).await
    }

    async fn stored_cursor(&self, query: &FeedQuery) -> FetchCursor {
        match self.storage.last_batch().await {
            Ok(Some(batch)) if &batch.query == query => {
                self.logger.debug(&format!("Resuming {} from stored page {}", query, batch.cursor.page()));
                batch.cursor
            }
            Ok(_) => FetchCursor::new(),
            Err(e) => {
                self.logger.warn(&format!("Failed to read stored batch: {}", e));
                FetchCursor::new()
            }
        }
    }
}
