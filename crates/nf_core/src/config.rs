//! Feed configuration: defaults, environment and TOML file layers.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::feed::{Blacklist, FeedRequest};
use crate::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_TARGET_COUNT: usize = 12;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const API_KEY_ENV: &str = "NEWS_API_KEY";

/// Paywalled publishers filtered out unless configured otherwise.
pub const PAYWALLED_SOURCES: &[&str] = &[
    "Bloomberg",
    "The Wall Street Journal",
    "Financial Times",
    "The New York Times",
    "The Washington Post",
    "The Economist",
    "Barron's",
    "MarketWatch",
    "The Times",
    "The Telegraph",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Upstream access key; required before any request is made
    pub api_key: Option<String>,
    pub base_url: String,
    /// Countries fetched for every top-headlines page
    pub countries: Vec<String>,
    pub page_size: u32,
    /// Used for search queries only
    pub language: String,
    pub sort_by: String,
    pub target_count: usize,
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
    pub blacklist: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            countries: vec!["us".to_string()],
            page_size: 20,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            target_count: DEFAULT_TARGET_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            request_timeout_secs: 30,
            blacklist: PAYWALLED_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeedConfig {
    /// Defaults overridden by `NEWS_API_KEY` and `NEWSFEED_*` variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("NEWSFEED_BASE_URL") {
            self.base_url = url;
        }
        if let Ok(countries) = std::env::var("NEWSFEED_COUNTRIES") {
            self.countries = split_list(&countries);
        }
        if let Some(size) = std::env::var("NEWSFEED_PAGE_SIZE").ok().and_then(|v| v.parse().ok()) {
            self.page_size = size;
        }
        if let Some(count) = std::env::var("NEWSFEED_TARGET_COUNT").ok().and_then(|v| v.parse().ok()) {
            self.target_count = count;
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid base url {}: {}", self.base_url, e)))?;
        if self.countries.is_empty() {
            return Err(Error::Config("at least one country is required".to_string()));
        }
        if self.page_size == 0 || self.page_size > 100 {
            return Err(Error::Config("page_size must be between 1 and 100".to_string()));
        }
        if self.target_count == 0 {
            return Err(Error::Config("target_count must be greater than 0".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// The access key, failing fast when it is absent.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("API key not found".to_string()))
    }

    pub fn blacklist(&self) -> Blacklist {
        self.blacklist.iter().cloned().collect()
    }

    pub fn request(&self) -> FeedRequest {
        FeedRequest::new(self.target_count, self.blacklist())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = FeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.target_count, 12);
        assert_eq!(config.max_attempts, 10);
        assert!(config.blacklist().contains("Bloomberg"));
    }

    #[test]
    fn test_missing_api_key() {
        let config = FeedConfig::default();
        let err = config.require_api_key().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let config = FeedConfig { api_key: Some("  ".to_string()), ..FeedConfig::default() };
        assert!(config.require_api_key().is_err());

        let config = FeedConfig { api_key: Some("key".to_string()), ..FeedConfig::default() };
        assert_eq!(config.require_api_key().unwrap(), "key");
    }

    #[test]
    fn test_invalid_values() {
        let mut config = FeedConfig::default();
        config.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = FeedConfig::default();
        config.countries.clear();
        assert!(config.validate().is_err());

        let mut config = FeedConfig::default();
        config.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "countries = [\"us\", \"gb\"]").unwrap();
        writeln!(file, "blacklist = [\"Bloomberg\", \"Financial Times\"]").unwrap();

        let config = FeedConfig::from_file(file.path()).unwrap();
        assert_eq!(config.countries, vec!["us", "gb"]);
        assert_eq!(config.blacklist().len(), 2);
        assert_eq!(config.page_size, 20);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("us, gb,,"), vec!["us", "gb"]);
        assert_eq!(split_list("Bloomberg, The Times"), vec!["Bloomberg", "The Times"]);
    }
}
