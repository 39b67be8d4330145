use async_trait::async_trait;
use futures::future::try_join_all;
use nf_core::{Error, FeedConfig, FeedQuery, Result};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use tracing::debug;
use url::Url;

use super::{HeadlineSource, Page, PageRequest, RawArticle};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    total_results: u32,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the NewsAPI v2 `top-headlines` and `everything` endpoints.
pub struct NewsApiSource {
    client: Client,
    api_key: String,
    base_url: String,
    countries: Vec<String>,
    page_size: u32,
    language: String,
    sort_by: String,
}

impl NewsApiSource {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("newsfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            countries: config.countries.iter().map(|c| c.to_lowercase()).collect(),
            page_size: config.page_size,
            language: config.language.clone(),
            sort_by: config.sort_by.clone(),
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.base_url, name))
            .map_err(|e| Error::Config(format!("Invalid base url {}: {}", self.base_url, e)))
    }

    fn headlines_url(&self, country: &str, category: Option<&str>, page: u32) -> Result<Url> {
        let mut url = self.endpoint("top-headlines")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("country", country);
            if let Some(category) = category {
                pairs.append_pair("category", category);
            }
            pairs
                .append_pair("pageSize", &self.page_size.to_string())
                .append_pair("page", &page.to_string());
        }
        Ok(url)
    }

    fn search_url(&self, term: &str, page: u32) -> Result<Url> {
        let mut url = self.endpoint("everything")?;
        url.query_pairs_mut()
            .append_pair("q", term)
            .append_pair("language", &self.language)
            .append_pair("sortBy", &self.sort_by)
            .append_pair("pageSize", &self.page_size.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<NewsApiResponse> {
        let endpoint = url.path().to_string();
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<NewsApiResponse>()
                .await
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
            return Err(Error::fetch(format!("HTTP {} from {}: {}", status.as_u16(), endpoint, message)));
        }

        let body = response.json::<NewsApiResponse>().await?;
        if body.status != "ok" {
            return Err(Error::fetch(format!(
                "{} returned status {}: {}",
                endpoint,
                body.status,
                body.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(body)
    }

    async fn fetch_headlines(&self, category: Option<&str>, page: u32) -> Result<Page> {
        let urls = self
            .countries
            .iter()
            .map(|country| self.headlines_url(country, category, page))
            .collect::<Result<Vec<_>>>()?;

        // Every country is awaited before anything is merged; one failure
        // fails the page.
        let responses = try_join_all(urls.into_iter().map(|url| self.get(url))).await?;

        let mut merged = Page::default();
        for (country, response) in self.countries.iter().zip(responses) {
            debug!("[FETCH] Page {} - {}: {} articles", page, country.to_uppercase(), response.articles.len());
            merged.total_results += response.total_results;
            merged.items.extend(response.articles);
        }
        Ok(merged)
    }
}

impl fmt::Debug for NewsApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiSource")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("countries", &self.countries)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[async_trait]
impl HeadlineSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Page> {
        match &request.query {
            FeedQuery::TopHeadlines => self.fetch_headlines(None, request.page).await,
            FeedQuery::Category(category) => self.fetch_headlines(Some(category.as_str()), request.page).await,
            FeedQuery::Search(term) => {
                let response = self.get(self.search_url(term, request.page)?).await?;
                Ok(Page {
                    items: response.articles,
                    total_results: response.total_results,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, countries: &[&str]) -> FeedConfig {
        FeedConfig {
            api_key: Some("test-key".to_string()),
            base_url: base_url.to_string(),
            countries: countries.iter().map(|c| c.to_string()).collect(),
            ..FeedConfig::default()
        }
    }

    fn article(title: &str, source: &str) -> serde_json::Value {
        json!({
            "source": {"id": null, "name": source},
            "author": "Staff",
            "title": title,
            "description": null,
            "url": format!("https://example.com/{}", title),
            "urlToImage": null,
            "publishedAt": "2026-10-18T09:30:00Z",
            "content": null
        })
    }

    fn ok_body(articles: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"status": "ok", "totalResults": articles.len(), "articles": articles})
    }

    #[test]
    fn test_requires_api_key() {
        let config = FeedConfig::default();
        let err = NewsApiSource::new(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_urls() {
        let source = NewsApiSource::new(&config("https://newsapi.org/v2/", &["us"])).unwrap();

        let url = source.headlines_url("us", Some("business"), 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/top-headlines?country=us&category=business&pageSize=20&page=3"
        );

        let url = source.search_url("rust lang", 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/everything?q=rust+lang&language=en&sortBy=publishedAt&pageSize=20&page=1"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let source = NewsApiSource::new(&config("https://newsapi.org/v2", &["us"])).unwrap();
        let debug = format!("{:?}", source);
        assert!(!debug.contains("test-key"));
    }

    #[tokio::test]
    async fn test_fetch_headlines_merges_countries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("page", "2"))
            .and(header("X-Api-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(vec![
                article("us-1", "CNN"),
                article("us-2", "Bloomberg"),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "gb"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(vec![article("gb-1", "BBC News")])))
            .expect(1)
            .mount(&server)
            .await;

        let source = NewsApiSource::new(&config(&server.uri(), &["us", "gb"])).unwrap();
        let page = source
            .fetch_page(&PageRequest { query: FeedQuery::TopHeadlines, page: 2 })
            .await
            .unwrap();

        let titles: Vec<_> = page.items.iter().filter_map(|a| a.title.as_deref()).collect();
        assert_eq!(titles, vec!["us-1", "us-2", "gb-1"]);
        assert_eq!(page.total_results, 3);
    }

    #[tokio::test]
    async fn test_failing_country_fails_the_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(vec![article("us-1", "CNN")])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("country", "gb"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let source = NewsApiSource::new(&config(&server.uri(), &["us", "gb"])).unwrap();
        let result = source
            .fetch_page(&PageRequest { query: FeedQuery::TopHeadlines, page: 1 })
            .await;

        match result {
            Err(Error::Fetch(detail)) => assert!(detail.contains("HTTP 500"), "{}", detail),
            other => panic!("expected a fetch error, got {:?}", other.map(|p| p.items.len())),
        }
    }

    #[tokio::test]
    async fn test_search_uses_everything_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/everything"))
            .and(query_param("q", "climate"))
            .and(query_param("sortBy", "publishedAt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(vec![article("c-1", "Reuters")])))
            .expect(1)
            .mount(&server)
            .await;

        let source = NewsApiSource::new(&config(&server.uri(), &["us", "gb"])).unwrap();
        let page = source
            .fetch_page(&PageRequest { query: FeedQuery::Search("climate".to_string()), page: 1 })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": "error",
                "code": "apiKeyInvalid",
                "message": "Your API key is invalid"
            })))
            .mount(&server)
            .await;

        let source = NewsApiSource::new(&config(&server.uri(), &["us"])).unwrap();
        let err = source
            .fetch_page(&PageRequest { query: FeedQuery::TopHeadlines, page: 1 })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to fetch news");
        assert!(err.detail().unwrap().contains("Your API key is invalid"));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_fetch_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let source = NewsApiSource::new(&config(&server.uri(), &["us"])).unwrap();
        let result = source
            .fetch_page(&PageRequest { query: FeedQuery::TopHeadlines, page: 1 })
            .await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }
}
