use std::time::Duration;

use threads_feed_core::config::{env_str, env_u16, env_u64};
use threads_feed_core::FeedConfig;

/// Server configuration derived from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Per-request timeout for the media proxy.
    pub proxy_timeout: Duration,
    pub feed: FeedConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind: env_str("FEED_BIND", "127.0.0.1"),
            port: env_u16("FEED_PORT", 3000),
            proxy_timeout: Duration::from_secs(env_u64("PROXY_TIMEOUT_SECS", 30)),
            feed: FeedConfig::from_env(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            proxy_timeout: Duration::from_secs(30),
            feed: FeedConfig::default(),
        }
    }
}
