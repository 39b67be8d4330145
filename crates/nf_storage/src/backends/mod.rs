pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;

use serde::{Deserialize, Serialize};

/// Everything a backend keeps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredState {
    pub last_batch: Option<nf_core::Batch>,
    pub favorites: Vec<String>,
}

impl StoredState {
    pub fn toggle_favorite(&mut self, url: &str) -> bool {
        if let Some(pos) = self.favorites.iter().position(|f| f == url) {
            self.favorites.remove(pos);
            false
        } else {
            self.favorites.push(url.to_string());
            true
        }
    }
}
