use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

use threads_feed_core::services::media_proxy::ProxiedMedia;
use threads_feed_core::{MediaKind, ProxyError};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// GET /api/proxy/image?url=…
pub async fn proxy_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    proxy(&state, query, MediaKind::Image).await
}

/// GET /api/proxy/video?url=…
pub async fn proxy_video(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Response {
    proxy(&state, query, MediaKind::Video).await
}

async fn proxy(state: &AppState, query: ProxyQuery, kind: MediaKind) -> Response {
    let url = query.url.unwrap_or_default();
    match state.media.fetch(&url, kind).await {
        Ok(media) => stream(media),
        Err(e) => proxy_error(e),
    }
}

fn stream(media: ProxiedMedia) -> Response {
    let kind = media.kind;
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, media.content_type.as_str())
        .header(CACHE_CONTROL, kind.cache_control())
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    for (name, value) in kind.extra_response_headers() {
        builder = builder.header(*name, *value);
    }
    if let Some(len) = media.content_length {
        builder = builder.header(CONTENT_LENGTH, len);
    }

    let body = Body::from_stream(media.response.bytes_stream());
    builder.body(body).unwrap_or_else(|e| {
        error!(error = %e, "failed to build proxy response");
        (StatusCode::INTERNAL_SERVER_ERROR, "Error fetching media").into_response()
    })
}

/// Plain-text error; 400 for a missing/invalid URL, 403/504/500 for upstream failures.
fn proxy_error(e: ProxyError) -> Response {
    let status = e.status();
    if status.is_server_error() {
        warn!(error = %e, %status, "media proxy failed");
    }
    (status, [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")], e.to_string()).into_response()
}
