use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{Article, ArticleId, FeedQuery};
use crate::{Error, Result};

/// Upstream page to resume from. Owned by the caller and threaded through
/// each assembly by value; the page never drops below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchCursor {
    page: u32,
}

impl FetchCursor {
    pub fn new() -> Self {
        Self { page: 1 }
    }

    pub fn at(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }

    pub fn advance(&mut self) {
        self.page = self.page.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

impl Default for FetchCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Source names whose articles never make it into a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist(BTreeSet<String>);

impl Blacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>) {
        self.0.insert(source.into());
    }

    pub fn contains(&self, source: &str) -> bool {
        self.0.contains(source)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Blacklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub target_count: usize,
    pub blacklist: Blacklist,
    pub query: FeedQuery,
}

impl FeedRequest {
    pub fn new(target_count: usize, blacklist: Blacklist) -> Self {
        Self {
            target_count,
            blacklist,
            query: FeedQuery::TopHeadlines,
        }
    }

    pub fn with_query(mut self, query: FeedQuery) -> Self {
        self.query = query;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_count == 0 {
            return Err(Error::InvalidRequest("target count must be positive".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyStats {
    pub pages_fetched: u32,
    pub items_fetched: usize,
    pub items_filtered: usize,
}

/// Output of one assembly call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub articles: Vec<Article>,
    /// Page the batch was read from, 1 if the call wrapped around
    pub start_page: u32,
    /// Where the next assembly for the same query should resume
    pub cursor: FetchCursor,
    pub query: FeedQuery,
    pub stats: AssemblyStats,
}

impl Batch {
    pub fn empty(query: FeedQuery) -> Self {
        Self {
            articles: Vec::new(),
            start_page: 1,
            cursor: FetchCursor::new(),
            query,
            stats: AssemblyStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn lookup(&self, id: ArticleId) -> Result<&Article> {
        self.articles
            .iter()
            .find(|a| a.id == id)
            .ok_or(Error::NotFound(id))
    }
}
