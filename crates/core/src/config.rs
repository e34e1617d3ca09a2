use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::entity::{default_catalog, parse_catalog, TrackedEntity};
use crate::storage::sample::SampleSource;

pub const DEFAULT_API_HOST: &str = "threads-api4.p.rapidapi.com";
pub const DEFAULT_CACHE_PATH: &str = "data/threads_cache.json";
const CACHE_FILE_NAME: &str = "threads_cache.json";

// ── Environment helpers ─────────────────────────────────────────────

pub fn env_str(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

/// Trimmed value, `None` when unset or blank.
pub fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

pub fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

pub fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "y" | "on"))
        .unwrap_or(default)
}

// ── Upstream ────────────────────────────────────────────────────────

/// Settings for the RapidAPI Threads search client.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// `None` ⇒ every search fails fast with a configuration error.
    pub api_key: Option<String>,
    pub api_host: String,
    /// Scheme + host the search path is appended to. Defaults to `https://{api_host}`.
    pub base_url: String,
    pub timeout: Duration,
    /// Total attempts per query (at least 1).
    pub retries: u32,
    pub retry_delay: Duration,
    /// Timeout of the quota probe used by [`FirstTier::ProbeLive`].
    pub probe_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_host: DEFAULT_API_HOST.to_string(),
            base_url: format!("https://{DEFAULT_API_HOST}"),
            timeout: Duration::from_secs(10),
            retries: 2,
            retry_delay: Duration::from_secs(2),
            probe_timeout: Duration::from_secs(5),
        }
    }
}

impl UpstreamConfig {
    pub fn from_env() -> Self {
        let api_host = env_str("THREADS_API_HOST", DEFAULT_API_HOST);
        let base_url = env_opt("THREADS_API_BASE_URL")
            .unwrap_or_else(|| format!("https://{api_host}"));

        Self {
            api_key: env_opt("THREADS_API_KEY").or_else(|| env_opt("RAPIDAPI_KEY")),
            api_host,
            base_url,
            timeout: Duration::from_secs(env_u64("THREADS_TIMEOUT_SECS", 10)),
            retries: env_u64("THREADS_RETRIES", 2).clamp(1, 10) as u32,
            retry_delay: Duration::from_millis(env_u64("THREADS_RETRY_DELAY_MS", 2000)),
            probe_timeout: Duration::from_secs(env_u64("THREADS_PROBE_TIMEOUT_SECS", 5)),
        }
    }
}

// ── Fallback policy ─────────────────────────────────────────────────

/// Which tier is consulted before going to the live API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTier {
    /// Serve a snapshot younger than `max_age` without touching the API.
    FreshCache,
    /// Probe the API quota first; skip straight to the fallback tiers on 429.
    ProbeLive,
}

impl FirstTier {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "live" | "probe" | "probe_live" => FirstTier::ProbeLive,
            _ => FirstTier::FreshCache,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeedPolicy {
    pub first_tier: FirstTier,
    pub max_age: Duration,
    /// Entities fetched concurrently per batch (at least 1).
    pub batch_size: usize,
    /// Serve an out-of-date snapshot when the live fetch fails.
    pub stale_fallback: bool,
    /// Union fresh results with the previous snapshot instead of replacing it.
    pub merge_snapshots: bool,
    /// TTL of the in-process response cache; `None` disables it.
    pub memory_ttl: Option<Duration>,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            first_tier: FirstTier::FreshCache,
            max_age: Duration::from_secs(60 * 60),
            batch_size: 2,
            stale_fallback: true,
            merge_snapshots: false,
            memory_ttl: Some(Duration::from_secs(5 * 60)),
        }
    }
}

impl FeedPolicy {
    pub fn from_env() -> Self {
        let memory_ttl = match env_u64("FEED_MEMORY_TTL_SECS", 300) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            first_tier: FirstTier::parse(&env_str("FEED_FIRST_TIER", "cache")),
            max_age: Duration::from_secs(env_u64("FEED_CACHE_MAX_AGE_SECS", 3600)),
            batch_size: env_u64("FEED_BATCH_SIZE", 2).max(1) as usize,
            stale_fallback: env_bool("FEED_STALE_FALLBACK", true),
            merge_snapshots: env_bool("FEED_MERGE_SNAPSHOTS", false),
            memory_ttl,
        }
    }
}

// ── Cache location ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub path: PathBuf,
    /// Ephemeral-filesystem deployment: snapshot writes are disabled.
    pub ephemeral: bool,
}

impl CacheConfig {
    pub fn durable(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ephemeral: false,
        }
    }

    /// Cache under the system temp directory, read-only.
    pub fn ephemeral() -> Self {
        Self {
            path: env::temp_dir().join("threads-feed").join(CACHE_FILE_NAME),
            ephemeral: true,
        }
    }

    pub fn from_env() -> Self {
        if env_bool("FEED_EPHEMERAL", false) || env_bool("VERCEL", false) {
            Self::ephemeral()
        } else {
            Self::durable(env_str("FEED_CACHE_PATH", DEFAULT_CACHE_PATH))
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::durable(DEFAULT_CACHE_PATH)
    }
}

// ── Top level ───────────────────────────────────────────────────────

/// Everything needed to build a [`crate::services::feed_service::FeedService`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub upstream: UpstreamConfig,
    pub policy: FeedPolicy,
    pub cache: CacheConfig,
    pub sample: SampleSource,
    pub catalog: Vec<TrackedEntity>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            policy: FeedPolicy::default(),
            cache: CacheConfig::default(),
            sample: SampleSource::Bundled,
            catalog: default_catalog(),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Self {
        let catalog = env_opt("FEED_TRACKED")
            .map(|s| parse_catalog(&s))
            .unwrap_or_else(default_catalog);

        Self {
            upstream: UpstreamConfig::from_env(),
            policy: FeedPolicy::from_env(),
            cache: CacheConfig::from_env(),
            sample: SampleSource::parse(&env_str("FEED_SAMPLE", "bundled")),
            catalog,
        }
    }
}
