use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::entity::TrackedEntity;
use super::post::{Pagination, PostRecord};
use crate::services::merger;

/// Pagination of the two queries behind one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePagination {
    pub name: Pagination,
    pub symbol: Pagination,
}

/// All posts found for one tracked entity.
///
/// Invariants: no two posts share an `id`, and `total_posts == posts.len()`.
/// Both are established by [`CurrencyResultBundle::new`], which is also the
/// path taken on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BundleRepr")]
pub struct CurrencyResultBundle {
    pub currency: String,
    pub symbol: String,
    posts: Vec<PostRecord>,
    total_posts: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<BundlePagination>,
}

#[derive(Deserialize)]
struct BundleRepr {
    currency: String,
    symbol: String,
    #[serde(default)]
    posts: Vec<PostRecord>,
    #[serde(default)]
    pagination: Option<BundlePagination>,
}

impl From<BundleRepr> for CurrencyResultBundle {
    fn from(repr: BundleRepr) -> Self {
        let mut bundle = CurrencyResultBundle::from_parts(repr.currency, repr.symbol, repr.posts);
        bundle.pagination = repr.pagination;
        bundle
    }
}

impl CurrencyResultBundle {
    /// Build a bundle for `entity`, dropping duplicate ids (first one wins).
    pub fn new(entity: &TrackedEntity, posts: Vec<PostRecord>) -> Self {
        Self::from_parts(entity.name.clone(), entity.symbol.clone(), posts)
    }

    fn from_parts(currency: String, symbol: String, posts: Vec<PostRecord>) -> Self {
        let posts = merger::merge([posts]);
        Self {
            currency,
            symbol,
            total_posts: posts.len(),
            posts,
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, pagination: BundlePagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn posts(&self) -> &[PostRecord] {
        &self.posts
    }

    pub fn total_posts(&self) -> usize {
        self.total_posts
    }

    pub fn into_posts(self) -> Vec<PostRecord> {
        self.posts
    }

    /// Whether this bundle belongs to `entity` (matched on the symbol).
    pub fn is_for(&self, entity: &TrackedEntity) -> bool {
        self.symbol.eq_ignore_ascii_case(&entity.symbol)
    }
}

/// The persisted result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(alias = "posts")]
    pub results: Vec<CurrencyResultBundle>,
    pub timestamp: DateTime<Utc>,
}

impl CacheSnapshot {
    /// A snapshot stamped with the current time.
    pub fn new(results: Vec<CurrencyResultBundle>) -> Self {
        Self::at(results, Utc::now())
    }

    pub fn at(results: Vec<CurrencyResultBundle>, timestamp: DateTime<Utc>) -> Self {
        Self { results, timestamp }
    }

    pub fn is_fresh(&self, max_age: Duration) -> bool {
        self.is_fresh_at(Utc::now(), max_age)
    }

    /// `now - timestamp < max_age`. An age exactly equal to `max_age` is stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let age = now.signed_duration_since(self.timestamp);
        match chrono::Duration::from_std(max_age) {
            Ok(max) => age < max,
            // Out of chrono's range: nothing can be that old.
            Err(_) => true,
        }
    }

    pub fn total_posts(&self) -> usize {
        self.results.iter().map(|b| b.total_posts()).sum()
    }

    pub fn bundle_for(&self, entity: &TrackedEntity) -> Option<&CurrencyResultBundle> {
        self.results.iter().find(|b| b.is_for(entity))
    }
}
