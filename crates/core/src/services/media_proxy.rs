//! Server-side fetch of remote images and videos.
//!
//! The CDN behind the posts rejects hotlinked requests, so media is fetched
//! with browser/app-like headers and streamed back to the client.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const APP_USER_AGENT: &str = "Instagram 219.0.0.12.117 Android";
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }

    /// Headers sent upstream.
    pub fn request_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            MediaKind::Image => &[
                ("User-Agent", DESKTOP_USER_AGENT),
                ("Accept", "image/webp,image/apng,image/*,*/*;q=0.8"),
                ("Referer", "https://www.instagram.com/"),
                ("Accept-Language", "en-US,en;q=0.9"),
            ],
            MediaKind::Video => &[
                ("User-Agent", APP_USER_AGENT),
                ("Accept", "video/mp4,video/*;q=0.9,*/*;q=0.8"),
                ("Range", "bytes=0-"),
                ("Sec-Fetch-Site", "cross-site"),
                ("Sec-Fetch-Mode", "no-cors"),
                ("Sec-Fetch-Dest", "video"),
            ],
        }
    }

    /// Used when upstream omits `Content-Type`.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Video => "video/mp4",
        }
    }

    pub fn cache_control(&self) -> &'static str {
        match self {
            MediaKind::Image => "public, max-age=31536000",
            MediaKind::Video => "public, max-age=86400",
        }
    }

    /// Headers added to the proxied response on top of type/cache/CORS.
    pub fn extra_response_headers(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            MediaKind::Image => &[],
            MediaKind::Video => &[("Accept-Ranges", "bytes"), ("Vary", "Origin")],
        }
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{} URL is required", .0.label())]
    MissingUrl(MediaKind),

    #[error("Invalid media URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream refused the media request")]
    Forbidden,

    #[error("Timed out fetching media")]
    Timeout,

    #[error("Error fetching media: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// HTTP status the proxy endpoint answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl(_) | ProxyError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ProxyError::Forbidden => StatusCode::FORBIDDEN,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A successful upstream media response, ready to be streamed.
#[derive(Debug)]
pub struct ProxiedMedia {
    pub kind: MediaKind,
    pub content_type: String,
    pub content_length: Option<u64>,
    pub response: reqwest::Response,
}

pub struct MediaProxy {
    client: Client,
}

impl MediaProxy {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Validate `raw_url` (absolute http/https) and fetch it with spoofed headers.
    pub async fn fetch(&self, raw_url: &str, kind: MediaKind) -> Result<ProxiedMedia, ProxyError> {
        let url = parse_media_url(raw_url, kind)?;
        debug!(kind = kind.label(), host = url.host_str().unwrap_or(""), "proxying media");

        let mut request = self.client.get(url);
        for (name, value) in kind.request_headers() {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProxyError::Timeout
            } else {
                ProxyError::Upstream(e.without_url().to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!(kind = kind.label(), "upstream refused media request");
            return Err(ProxyError::Forbidden);
        }
        if !status.is_success() {
            warn!(kind = kind.label(), %status, "upstream media request failed");
            return Err(ProxyError::Upstream(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(kind.default_content_type())
            .to_string();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        Ok(ProxiedMedia {
            kind,
            content_type,
            content_length,
            response,
        })
    }
}

/// The `url` query parameter, already percent-decoded once by the router.
pub fn parse_media_url(raw: &str, kind: MediaKind) -> Result<Url, ProxyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProxyError::MissingUrl(kind));
    }
    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ProxyError::InvalidUrl(format!("unsupported scheme {other:?}"))),
    }
}
