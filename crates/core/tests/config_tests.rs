// ═══════════════════════════════════════════════════════════════════
// Config Tests — defaults and value parsing
// ═══════════════════════════════════════════════════════════════════

use std::time::Duration;

use threads_feed_core::config::{
    CacheConfig, FeedConfig, FeedPolicy, FirstTier, UpstreamConfig, DEFAULT_API_HOST,
    DEFAULT_CACHE_PATH,
};
use threads_feed_core::models::entity::default_catalog;
use threads_feed_core::storage::sample::SampleSource;

#[test]
fn upstream_defaults() {
    let c = UpstreamConfig::default();
    assert!(c.api_key.is_none());
    assert_eq!(c.api_host, DEFAULT_API_HOST);
    assert_eq!(c.base_url, "https://threads-api4.p.rapidapi.com");
    assert_eq!(c.timeout, Duration::from_secs(10));
    assert_eq!(c.retries, 2);
    assert_eq!(c.retry_delay, Duration::from_secs(2));
    assert_eq!(c.probe_timeout, Duration::from_secs(5));
}

#[test]
fn policy_defaults() {
    let p = FeedPolicy::default();
    assert_eq!(p.first_tier, FirstTier::FreshCache);
    assert_eq!(p.max_age, Duration::from_secs(3600));
    assert_eq!(p.batch_size, 2);
    assert!(p.stale_fallback);
    assert!(!p.merge_snapshots);
    assert_eq!(p.memory_ttl, Some(Duration::from_secs(300)));
}

#[test]
fn feed_defaults() {
    let c = FeedConfig::default();
    assert_eq!(c.cache.path.to_str(), Some(DEFAULT_CACHE_PATH));
    assert!(!c.cache.ephemeral);
    assert_eq!(c.sample, SampleSource::Bundled);
    assert_eq!(c.catalog, default_catalog());
}

#[test]
fn first_tier_parsing() {
    assert_eq!(FirstTier::parse("cache"), FirstTier::FreshCache);
    assert_eq!(FirstTier::parse(""), FirstTier::FreshCache);
    assert_eq!(FirstTier::parse("live"), FirstTier::ProbeLive);
    assert_eq!(FirstTier::parse(" PROBE "), FirstTier::ProbeLive);
    assert_eq!(FirstTier::parse("probe_live"), FirstTier::ProbeLive);
    assert_eq!(FirstTier::parse("whatever"), FirstTier::FreshCache);
}

#[test]
fn durable_cache_is_writable() {
    let c = CacheConfig::durable("/var/lib/feed/cache.json");
    assert!(!c.ephemeral);
    assert_eq!(c.path.to_str(), Some("/var/lib/feed/cache.json"));
}
