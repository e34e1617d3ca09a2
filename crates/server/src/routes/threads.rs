use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::info;

use threads_feed_core::FeedResponse;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/threads
pub async fn get_threads(State(state): State<Arc<AppState>>) -> Result<Json<FeedResponse>, ApiError> {
    let response = state.feed.handle_request().await?;
    info!(
        source = %response.source,
        stale = response.stale,
        posts = response.data.total_posts(),
        "feed served"
    );
    Ok(Json(response))
}
