pub mod config;
pub mod error;
pub mod feed;
pub mod storage;
pub mod types;

pub use config::FeedConfig;
pub use error::{Error, Result};
pub use feed::{AssemblyStats, Batch, Blacklist, FeedRequest, FetchCursor};
pub use storage::ArticleStorage;
pub use types::{Article, ArticleId, FeedQuery};
