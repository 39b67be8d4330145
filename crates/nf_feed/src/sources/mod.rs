use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nf_core::{Article, ArticleId, FeedQuery, Result};
use serde::{Deserialize, Deserializer, Serialize};

pub mod newsapi;

pub use newsapi::NewsApiSource;

/// One upstream page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: FeedQuery,
    pub page: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<RawArticle>,
    /// Total hits the upstream reports for the query
    pub total_results: u32,
}

impl Page {
    pub fn new(items: Vec<RawArticle>) -> Self {
        let total_results = items.len() as u32;
        Self { items, total_results }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Article as the upstream sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(default)]
    pub source: RawSource,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub content: Option<String>,
}

impl RawArticle {
    pub fn source_name(&self) -> &str {
        &self.source.name
    }

    /// Converts into the normalized shape. Items without a title or a
    /// usable timestamp yield `None`.
    pub fn normalize(self, id: ArticleId, category: Option<&str>) -> Option<Article> {
        let title = non_empty(self.title)?;
        let published_at = self.published_at?;
        Some(Article {
            id,
            title,
            description: non_empty(self.description),
            content: non_empty(self.content),
            image: non_empty(self.url_to_image),
            author: non_empty(self.author),
            url: non_empty(self.url),
            source: self.source.name,
            published_at,
            category: category.map(str::to_string),
        })
    }
}

/// A missing, null or unparseable `publishedAt` string becomes `None` so
/// one bad item does not fail the whole page.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok().map(|t| t.with_timezone(&Utc))))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A paginated headline API.
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Returns the name of the upstream
    fn name(&self) -> &str;

    /// Fetches one page. Any failure, including a malformed payload, is
    /// reported as `Error::Fetch`.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;
}
