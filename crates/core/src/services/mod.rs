pub mod feed_service;
pub mod media_proxy;
pub mod merger;
pub mod normalizer;
pub mod response_cache;
