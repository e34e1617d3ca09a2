use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::{FeedConfig, FeedPolicy, FirstTier};
use crate::errors::CoreError;
use crate::models::entity::TrackedEntity;
use crate::models::post::Pagination;
use crate::models::response::{FeedResponse, FeedSource};
use crate::models::snapshot::{BundlePagination, CacheSnapshot, CurrencyResultBundle};
use crate::providers::threads_api::ThreadsApiProvider;
use crate::providers::traits::SearchProvider;
use crate::services::merger;
use crate::services::response_cache::ResponseCache;
use crate::storage::sample::SampleSource;
use crate::storage::snapshot_store::{merge_snapshots, SnapshotStore};

/// Decides, per request, where the feed comes from.
///
/// Chain:
/// 1. In-memory response cache (if enabled and within TTL) → `saved`.
/// 2. First tier per [`FirstTier`]: a fresh snapshot → `cache`, or a quota
///    probe that skips the live fetch on failure.
/// 3. Live fetch of every tracked entity → `api`, snapshot written.
/// 4. On failure: snapshot of any age → `cache` (stale), then sample data →
///    `sample`, then [`CoreError::FeedUnavailable`].
pub struct FeedService {
    provider: Arc<dyn SearchProvider>,
    store: SnapshotStore,
    sample: SampleSource,
    catalog: Vec<TrackedEntity>,
    policy: FeedPolicy,
    memory: Option<ResponseCache>,
}

impl FeedService {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        store: SnapshotStore,
        sample: SampleSource,
        catalog: Vec<TrackedEntity>,
        policy: FeedPolicy,
    ) -> Self {
        let memory = policy.memory_ttl.map(ResponseCache::new);
        Self {
            provider,
            store,
            sample,
            catalog,
            policy,
            memory,
        }
    }

    /// Wire the service against the real Threads API.
    pub fn from_config(config: &FeedConfig) -> Self {
        let provider = Arc::new(ThreadsApiProvider::new(config.upstream.clone()));
        Self::new(
            provider,
            SnapshotStore::new(&config.cache),
            config.sample.clone(),
            config.catalog.clone(),
            config.policy.clone(),
        )
    }

    /// Handle one feed request. Only total exhaustion of the chain is an error.
    pub async fn handle_request(&self) -> Result<FeedResponse, CoreError> {
        if let Some(memory) = &self.memory {
            if let Some(mut saved) = memory.get() {
                debug!("serving feed from in-memory response cache");
                saved.source = FeedSource::Saved;
                return Ok(saved);
            }
        }

        let response = self.resolve().await?;
        if let Some(memory) = &self.memory {
            memory.put(response.clone());
        }
        Ok(response)
    }

    async fn resolve(&self) -> Result<FeedResponse, CoreError> {
        match self.policy.first_tier {
            FirstTier::FreshCache => {
                if let Some(snapshot) = self.store.load().await {
                    if snapshot.is_fresh(self.policy.max_age) {
                        info!(timestamp = %snapshot.timestamp, "serving fresh cached snapshot");
                        return Ok(FeedResponse::new(
                            snapshot,
                            FeedSource::Cache,
                            "Serving cached data",
                        ));
                    }
                    debug!(timestamp = %snapshot.timestamp, "cached snapshot is stale");
                }
            }
            FirstTier::ProbeLive => {
                if let Err(e) = self.provider.check_limit().await {
                    warn!(error = %e, "API limit check failed, skipping live fetch");
                    return self.fallback(e.is_rate_limited(), e.to_string()).await;
                }
            }
        }

        match self.fetch_live().await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(error = %e, "live fetch failed, falling back");
                self.fallback(e.is_rate_limited(), e.to_string()).await
            }
        }
    }

    /// Fetch every tracked entity in sequential batches. Succeeds when at
    /// least one entity produced a bundle.
    async fn fetch_live(&self) -> Result<FeedResponse, CoreError> {
        if self.catalog.is_empty() {
            return Err(CoreError::ValidationError("no tracked entities configured".into()));
        }
        info!(
            entities = self.catalog.len(),
            batch_size = self.policy.batch_size,
            "fetching fresh data from {}",
            self.provider.name()
        );

        let mut bundles = Vec::with_capacity(self.catalog.len());
        let mut failures: Vec<(&TrackedEntity, CoreError)> = Vec::new();

        for batch in self.catalog.chunks(self.policy.batch_size.max(1)) {
            let results = join_all(batch.iter().map(|entity| self.fetch_entity(entity))).await;
            for (entity, result) in batch.iter().zip(results) {
                match result {
                    Ok(bundle) => bundles.push(bundle),
                    Err(e) => {
                        warn!(entity = %entity.name, error = %e, "entity fetch failed");
                        failures.push((entity, e));
                    }
                }
            }
        }

        if bundles.is_empty() {
            let provider = self.provider.name().to_string();
            if failures.iter().all(|(_, e)| e.is_rate_limited()) {
                return Err(CoreError::RateLimited { provider });
            }
            return Err(CoreError::UpstreamUnavailable {
                provider,
                message: describe_failures(&failures),
            });
        }

        let mut snapshot = CacheSnapshot::new(bundles);
        if self.policy.merge_snapshots {
            if let Some(existing) = self.store.load().await {
                snapshot = merge_snapshots(existing, snapshot);
                self.order_by_catalog(&mut snapshot.results);
            }
        }

        // Best-effort: a failed write is logged by the store and never fails the request.
        self.store.save(snapshot.clone()).await;

        let message = if failures.is_empty() {
            "Fresh data fetched successfully".to_string()
        } else {
            format!(
                "Fresh data fetched with {} of {} entities failing ({})",
                failures.len(),
                self.catalog.len(),
                describe_failures(&failures)
            )
        };
        Ok(FeedResponse::new(snapshot, FeedSource::Api, message))
    }

    /// Search by name and by symbol concurrently and merge the two result sets.
    /// One failing half still yields a bundle from the other.
    async fn fetch_entity(&self, entity: &TrackedEntity) -> Result<CurrencyResultBundle, CoreError> {
        let [name, symbol] = entity.queries();
        let (by_name, by_symbol) =
            tokio::join!(self.provider.search(name), self.provider.search(symbol));

        let (name_posts, name_pages, symbol_posts, symbol_pages) = match (by_name, by_symbol) {
            (Ok(name), Ok(symbol)) => (name.posts, name.pagination, symbol.posts, symbol.pagination),
            (Ok(name), Err(e)) => {
                warn!(query = %entity.symbol, error = %e, "symbol query failed, using name results only");
                (name.posts, name.pagination, Vec::new(), Pagination::default())
            }
            (Err(e), Ok(symbol)) => {
                warn!(query = %entity.name, error = %e, "name query failed, using symbol results only");
                (Vec::new(), Pagination::default(), symbol.posts, symbol.pagination)
            }
            (Err(a), Err(b)) => {
                // An entity counts as rate limited if either query hit the quota.
                return Err(if b.is_rate_limited() && !a.is_rate_limited() { b } else { a });
            }
        };

        let posts = merger::merge([name_posts, symbol_posts]);
        debug!(entity = %entity.name, posts = posts.len(), "entity fetched");

        Ok(CurrencyResultBundle::new(entity, posts).with_pagination(BundlePagination {
            name: name_pages,
            symbol: symbol_pages,
        }))
    }

    /// Stale snapshot, then sample data, then a hard error.
    async fn fallback(&self, rate_limited: bool, reason: String) -> Result<FeedResponse, CoreError> {
        if self.policy.stale_fallback {
            if let Some(snapshot) = self.store.load().await {
                info!(timestamp = %snapshot.timestamp, "serving cached snapshot as fallback");
                let is_fresh = snapshot.is_fresh(self.policy.max_age);
                let response = FeedResponse::new(
                    snapshot,
                    FeedSource::Cache,
                    format!("Live data unavailable ({reason}); serving cached data"),
                );
                return Ok(if is_fresh { response } else { response.stale() });
            }
        }

        if let Some(sample) = self.sample.load() {
            info!("serving bundled sample data as fallback");
            return Ok(FeedResponse::new(
                sample,
                FeedSource::Sample,
                format!("Live data unavailable ({reason}); serving sample data"),
            ));
        }

        error!(reason = %reason, rate_limited, "every feed tier failed");
        Err(CoreError::FeedUnavailable {
            rate_limited,
            message: reason,
        })
    }

    /// Catalog order first; bundles for entities no longer tracked go last.
    fn order_by_catalog(&self, bundles: &mut [CurrencyResultBundle]) {
        bundles.sort_by_key(|b| {
            self.catalog
                .iter()
                .position(|entity| b.is_for(entity))
                .unwrap_or(usize::MAX)
        });
    }
}

fn describe_failures(failures: &[(&TrackedEntity, CoreError)]) -> String {
    failures
        .iter()
        .map(|(entity, e)| format!("{}: {e}", entity.name))
        .collect::<Vec<_>>()
        .join("; ")
}
