use thiserror::Error;

/// Unified error type for the threads-feed-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Upstream / Network ──────────────────────────────────────────
    /// Upstream answered 429. Never retried; triggers the fallback chain.
    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    /// Retries exhausted (timeout, 5xx, transport error, unreadable body).
    #[error("{provider} unavailable: {message}")]
    UpstreamUnavailable { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Storage / File ──────────────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Every tier of the fallback chain came up empty.
    #[error("Feed unavailable: {message}")]
    FeedUnavailable { rate_limited: bool, message: String },
}

impl CoreError {
    /// True for errors that mean "the upstream quota is exhausted".
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CoreError::RateLimited { .. } => true,
            CoreError::FeedUnavailable { rate_limited, .. } => *rate_limited,
            _ => false,
        }
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

/// The request URL is stripped; the query is reported separately by callers.
impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Network(e.without_url().to_string())
    }
}
