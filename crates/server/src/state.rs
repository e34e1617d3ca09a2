use std::sync::Arc;

use threads_feed_core::{FeedService, MediaProxy};

use crate::config::ServerConfig;

/// Shared application state, passed to all route handlers via `axum::extract::State`.
pub struct AppState {
    pub config: ServerConfig,
    pub feed: FeedService,
    pub media: MediaProxy,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let feed = FeedService::from_config(&config.feed);
        Self::with_feed(config, feed)
    }

    /// Build the state around an already wired feed service.
    pub fn with_feed(config: ServerConfig, feed: FeedService) -> Arc<Self> {
        let media = MediaProxy::new(config.proxy_timeout);
        Arc::new(Self {
            config,
            feed,
            media,
        })
    }
}
