use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an article within one assembled batch.
///
/// Ids are only unique inside the batch that produced them; a new batch
/// reuses the same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u32);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ArticleId {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(ArticleId)
            .map_err(|_| crate::Error::InvalidRequest(format!("Invalid article id: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Content without the `[+1234 chars]` marker NewsAPI appends to
    /// truncated snippets.
    pub fn body(&self) -> Option<String> {
        self.content.as_deref().map(strip_truncation_marker)
    }

    pub fn short_title(&self, max: usize) -> String {
        if self.title.chars().count() > max {
            let cut: String = self.title.chars().take(max).collect();
            format!("{}...", cut)
        } else {
            self.title.clone()
        }
    }

    /// e.g. `Oct 18, 2026`
    pub fn short_date(&self) -> String {
        self.published_at.format("%b %-d, %Y").to_string()
    }

    /// e.g. `October 18, 2026 at 14:05`
    pub fn long_date(&self) -> String {
        self.published_at.format("%B %-d, %Y at %H:%M").to_string()
    }
}

fn strip_truncation_marker(content: &str) -> String {
    let trimmed = content.trim_end();
    if let Some(start) = trimmed.rfind("[+") {
        let tail = &trimmed[start + 2..];
        if let Some(digits) = tail.strip_suffix(" chars]") {
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
                return trimmed[..start].trim_end().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// What a batch is assembled from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FeedQuery {
    #[default]
    TopHeadlines,
    /// Top headlines restricted to an upstream category (business, sports...)
    Category(String),
    /// Free text search over the whole upstream corpus
    Search(String),
}

impl FeedQuery {
    /// Builds a query from optional category / search inputs. Blank values
    /// are ignored; a search term wins over a category.
    pub fn from_parts(category: Option<&str>, search: Option<&str>) -> Self {
        let clean = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        match (clean(category), clean(search)) {
            (_, Some(term)) => FeedQuery::Search(term),
            (Some(category), None) => FeedQuery::Category(category.to_lowercase()),
            (None, None) => FeedQuery::TopHeadlines,
        }
    }

    /// Tag attached to articles assembled for this query.
    pub fn tag(&self) -> Option<&str> {
        match self {
            FeedQuery::TopHeadlines => None,
            FeedQuery::Category(c) => Some(c.as_str()),
            FeedQuery::Search(t) => Some(t.as_str()),
        }
    }
}

impl fmt::Display for FeedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedQuery::TopHeadlines => write!(f, "top headlines"),
            FeedQuery::Category(c) => write!(f, "category {}", c),
            FeedQuery::Search(t) => write!(f, "search \"{}\"", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str, content: Option<&str>) -> Article {
        Article {
            id: ArticleId(0),
            title: title.to_string(),
            description: None,
            content: content.map(str::to_string),
            image: None,
            author: None,
            url: None,
            source: "test".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 10, 18, 14, 5, 0).unwrap(),
            category: None,
        }
    }

    #[test]
    fn test_body_strips_truncation_marker() {
        let a = article("t", Some("The market rallied on Friday… [+2841 chars]"));
        assert_eq!(a.body().as_deref(), Some("The market rallied on Friday…"));

        let a = article("t", Some("Nothing to strip [+ chars]"));
        assert_eq!(a.body().as_deref(), Some("Nothing to strip [+ chars]"));

        assert!(article("t", None).body().is_none());
    }

    #[test]
    fn test_short_title() {
        let a = article("Short", None);
        assert_eq!(a.short_title(50), "Short");

        let a = article("abcdefghij", None);
        assert_eq!(a.short_title(4), "abcd...");
    }

    #[test]
    fn test_dates() {
        let a = article("t", None);
        assert_eq!(a.short_date(), "Oct 18, 2026");
        assert_eq!(a.long_date(), "October 18, 2026 at 14:05");
    }

    #[test]
    fn test_article_json_shape() {
        let json = serde_json::to_value(article("t", None)).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["publishedAt"], "2026-10-18T14:05:00Z");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_query_from_parts() {
        assert_eq!(FeedQuery::from_parts(None, None), FeedQuery::TopHeadlines);
        assert_eq!(FeedQuery::from_parts(Some(" "), Some("")), FeedQuery::TopHeadlines);
        assert_eq!(
            FeedQuery::from_parts(Some("Sports"), None),
            FeedQuery::Category("sports".to_string())
        );
        assert_eq!(
            FeedQuery::from_parts(Some("sports"), Some("rust")),
            FeedQuery::Search("rust".to_string())
        );
        assert_eq!(FeedQuery::TopHeadlines.tag(), None);
    }

    #[test]
    fn test_article_id_parse() {
        assert_eq!("12".parse::<ArticleId>().unwrap(), ArticleId(12));
        assert!("abc".parse::<ArticleId>().is_err());
    }
}
