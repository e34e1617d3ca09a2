use serde::{Deserialize, Serialize};

use super::snapshot::CacheSnapshot;

/// Which tier of the fallback chain produced a response. Informational only:
/// clients render the data the same way whatever the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    /// Fetched live from the upstream API during this request.
    Api,
    /// Read from the snapshot file (fresh hit, or stale fallback).
    Cache,
    /// Replayed from the in-process response cache.
    Saved,
    /// Bundled sample data, the last tier.
    Sample,
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FeedSource::Api => "api",
            FeedSource::Cache => "cache",
            FeedSource::Saved => "saved",
            FeedSource::Sample => "sample",
        };
        f.write_str(s)
    }
}

/// Body of a successful `GET /api/threads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: CacheSnapshot,
    pub source: FeedSource,
    /// Set when cached data older than the max age was served.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl FeedResponse {
    pub fn new(data: CacheSnapshot, source: FeedSource, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
            source,
            stale: false,
        }
    }

    pub fn stale(mut self) -> Self {
        self.stale = true;
        self
    }
}
