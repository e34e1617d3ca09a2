use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::{debug, warn};

use super::traits::SearchProvider;
use crate::config::UpstreamConfig;
use crate::errors::CoreError;
use crate::models::post::SearchPage;
use crate::models::raw::RawSearchResponse;
use crate::services::normalizer;

const PROVIDER_NAME: &str = "Threads API";
const SEARCH_PATH: &str = "/api/search/recent";
const PROBE_QUERY: &str = "test";

/// RapidAPI "Threads API" search client.
///
/// - **Auth**: `X-RapidAPI-Key` + `X-RapidAPI-Host` headers.
/// - **Endpoint**: `GET /api/search/recent?query={q}`
/// - **Limits**: the free plan runs out quickly; a 429 is surfaced as
///   [`CoreError::RateLimited`] immediately instead of being retried.
pub struct ThreadsApiProvider {
    client: Client,
    config: UpstreamConfig,
}

impl ThreadsApiProvider {
    pub fn new(config: UpstreamConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    fn search_url(&self) -> String {
        format!("{}{SEARCH_PATH}", self.config.base_url.trim_end_matches('/'))
    }

    fn api_key(&self) -> Result<&str, CoreError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| CoreError::Configuration("Threads API key is not configured".into()))
    }

    fn request(&self, api_key: &str, query: &str) -> RequestBuilder {
        self.client
            .get(self.search_url())
            .query(&[("query", query)])
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", &self.config.api_host)
    }

    fn unavailable(message: impl Into<String>) -> CoreError {
        CoreError::UpstreamUnavailable {
            provider: PROVIDER_NAME.into(),
            message: message.into(),
        }
    }

    /// One attempt. `RateLimited` is terminal; every other error is retryable.
    async fn attempt(&self, api_key: &str, query: &str) -> Result<SearchPage, CoreError> {
        let resp = self.request(api_key, query).send().await?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CoreError::RateLimited {
                provider: PROVIDER_NAME.into(),
            });
        }
        if !status.is_success() {
            return Err(Self::unavailable(format!("HTTP {status} for query {query:?}")));
        }

        let raw: RawSearchResponse = resp.json().await.map_err(|e| {
            CoreError::Deserialization(format!(
                "Failed to parse search response for {query:?}: {}",
                e.without_url()
            ))
        })?;

        let (posts, pagination) = normalizer::normalize_response(&raw);
        Ok(SearchPage { posts, pagination })
    }
}

#[async_trait]
impl SearchProvider for ThreadsApiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search(&self, query: &str) -> Result<SearchPage, CoreError> {
        if query.trim().is_empty() {
            return Err(CoreError::ValidationError("search query must not be empty".into()));
        }
        let api_key = self.api_key()?;

        let attempts = self.config.retries.max(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=attempts {
            debug!(query, attempt, "fetching posts");
            match self.attempt(api_key, query).await {
                Ok(page) => {
                    debug!(query, attempt, posts = page.posts.len(), "search succeeded");
                    return Ok(page);
                }
                Err(e @ CoreError::RateLimited { .. }) => {
                    warn!(query, attempt, "rate limited, not retrying");
                    return Err(e);
                }
                Err(e) => {
                    warn!(query, attempt, error = %e, "search attempt failed");
                    last_error = e.to_string();
                }
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.retry_delay).await;
            }
        }

        Err(Self::unavailable(format!(
            "{last_error} (after {attempts} attempts)"
        )))
    }

    async fn check_limit(&self) -> Result<(), CoreError> {
        let api_key = self.api_key()?;

        let resp = self
            .request(api_key, PROBE_QUERY)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .map_err(|e| Self::unavailable(CoreError::from(e).to_string()))?;

        match resp.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(CoreError::RateLimited {
                provider: PROVIDER_NAME.into(),
            }),
            status if status.is_success() => Ok(()),
            status => Err(Self::unavailable(format!("limit check returned HTTP {status}"))),
        }
    }
}
