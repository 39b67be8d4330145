use nf_core::{ArticleStorage, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

pub const DEFAULT_STATE_PATH: &str = "newsfeed-state.json";

/// Creates a backend by name: `memory` or `file`.
pub fn create_storage(kind: &str, path: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        "file" => {
            let path = path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
            Ok(Arc::new(FileStorage::new(path)))
        }
        other => Err(Error::Config(format!(
            "Unknown storage backend: {} (expected memory or file)",
            other
        ))),
    }
}
