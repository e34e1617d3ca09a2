pub mod proxy;
pub mod threads;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the API router. The proxy routes set their own CORS header, so the
/// CORS layer only wraps the JSON endpoints.
pub fn api_router() -> Router<Arc<AppState>> {
    let json = Router::new()
        .route("/api/threads", get(threads::get_threads))
        .route("/health", get(health))
        .layer(CorsLayer::permissive());

    let media = Router::new()
        .route("/api/proxy/image", get(proxy::proxy_image))
        .route("/api/proxy/video", get(proxy::proxy_video));

    json.merge(media)
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
