use std::sync::Arc;
use nf_feed::FeedService;

pub struct AppState {
    pub service: Arc<FeedService>,
}
