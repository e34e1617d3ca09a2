pub mod config;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

pub use config::FeedConfig;
pub use errors::CoreError;
pub use models::response::{FeedResponse, FeedSource};
pub use services::feed_service::FeedService;
pub use services::media_proxy::{MediaKind, MediaProxy, ProxyError};
