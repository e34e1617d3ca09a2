use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::post::SearchPage;

/// Seam between the fallback chain and a concrete post search API.
///
/// The orchestrator only ever talks to this trait, so tests can swap in
/// scripted providers and a different upstream only needs a new impl.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Run one search query and return normalized posts.
    ///
    /// Fails with [`CoreError::RateLimited`] on a 429 (not retried) and
    /// [`CoreError::UpstreamUnavailable`] once the retry budget is spent.
    async fn search(&self, query: &str) -> Result<SearchPage, CoreError>;

    /// Lightweight quota probe. `Ok(())` means a live fetch is worth trying.
    async fn check_limit(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
