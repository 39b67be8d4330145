use nf_core::{
    Article, ArticleId, AssemblyStats, Batch, FeedConfig, FeedRequest, FetchCursor, Result,
};
use std::sync::Arc;

use crate::logging::Logger;
use crate::sources::{HeadlineSource, NewsApiSource, PageRequest};

pub const MAX_ATTEMPTS: u32 = nf_core::config::DEFAULT_MAX_ATTEMPTS;

/// Collects a fixed number of articles from a paginated upstream, one page at
/// a time, skipping blacklisted sources.
pub struct FeedAssembler {
    source: Arc<dyn HeadlineSource>,
    max_attempts: u32,
    logger: Logger,
}

impl FeedAssembler {
    pub fn new(source: Arc<dyn HeadlineSource>) -> Self {
        Self {
            source,
            max_attempts: MAX_ATTEMPTS,
            logger: Logger::new(),
        }
    }

    /// Assembler over NewsAPI. Fails before any request when the key is
    /// missing.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let source = NewsApiSource::new(config)?;
        Ok(Self::new(Arc::new(source)).with_max_attempts(config.max_attempts))
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Assembles up to `request.target_count` articles starting at `cursor`.
    ///
    /// Each page fetch counts as one attempt, empty pages included. An empty
    /// page past page 1 wraps the cursor back to page 1; an empty page 1
    /// means the upstream has nothing left. When the target is not reached
    /// the returned batch is partial and its cursor points at page 1.
    pub async fn assemble(&self, cursor: FetchCursor, request: &FeedRequest) -> Result<Batch> {
        request.validate()?;

        let fetch_log = self.logger.clone().with_new_prefixes("[FETCH]");
        let filter_log = self.logger.clone().with_new_prefixes("[FILTER]");

        let target = request.target_count;
        let tag = request.query.tag();
        let mut page = cursor;
        let mut start_page = cursor.page();
        let mut attempts = 0u32;
        let mut stats = AssemblyStats::default();
        let mut collected: Vec<Article> = Vec::with_capacity(target);

        fetch_log.info(&format!("Starting {} from page {}", request.query, page.page()));

        while collected.len() < target && attempts < self.max_attempts {
            let fetched = self
                .source
                .fetch_page(&PageRequest {
                    query: request.query.clone(),
                    page: page.page(),
                })
                .await;
            attempts += 1;
            stats.pages_fetched += 1;

            let fetched = match fetched {
                Ok(fetched) => fetched,
                Err(e) => {
                    fetch_log.error(&format!(
                        "Page {} failed, aborting: {}",
                        page.page(),
                        e.detail().unwrap_or(&e.to_string())
                    ));
                    return Err(e);
                }
            };

            if fetched.is_empty() {
                if page.is_first() {
                    fetch_log.info("Page 1 returned no articles, upstream exhausted");
                    break;
                }
                fetch_log.info(&format!("Page {} returned no articles, resetting to page 1", page.page()));
                page.reset();
                start_page = 1;
                continue;
            }

            stats.items_fetched += fetched.items.len();
            fetch_log.debug(&format!(
                "Page {}: fetched {} articles ({} reported upstream)",
                page.page(),
                fetched.items.len(),
                fetched.total_results
            ));

            let (blocked, valid): (Vec<_>, Vec<_>) = fetched
                .items
                .into_iter()
                .partition(|item| request.blacklist.contains(item.source_name()));

            if !blocked.is_empty() {
                let names: Vec<&str> = blocked.iter().map(|item| item.source_name()).collect();
                filter_log.info(&format!(
                    "Page {}: blocked {} articles from: {}",
                    page.page(),
                    blocked.len(),
                    names.join(", ")
                ));
            }
            stats.items_filtered += blocked.len();

            let mut accepted = 0;
            for item in valid {
                let id = ArticleId(collected.len() as u32);
                match item.normalize(id, tag) {
                    Some(article) => {
                        collected.push(article);
                        accepted += 1;
                    }
                    None => stats.items_filtered += 1,
                }
            }
            filter_log.debug(&format!("Page {}: {} valid articles after filtering", page.page(), accepted));

            page.advance();
        }

        let next = if collected.len() >= target {
            page
        } else {
            FetchCursor::new()
        };
        collected.truncate(target);

        fetch_log.info(&format!(
            "Complete: fetched {}, filtered out {}, collected {} in {} pages, next page {}",
            stats.items_fetched,
            stats.items_filtered,
            collected.len(),
            stats.pages_fetched,
            next.page()
        ));

        Ok(Batch {
            articles: collected,
            start_page,
            cursor: next,
            query: request.query.clone(),
            stats,
        })
    }
}
