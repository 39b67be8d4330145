use thiserror::Error;

use crate::types::ArticleId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any upstream failure. The detail is kept for logs; callers only ever
    /// see the generic message.
    #[error("Failed to fetch news")]
    Fetch(String),

    #[error("Article not found: {0}")]
    NotFound(ArticleId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn fetch(detail: impl Into<String>) -> Self {
        Error::Fetch(detail.into())
    }

    /// Upstream detail for a fetch failure, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Fetch(detail) => Some(detail.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
